//! Runtime settings for the HTTP server binary.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors raised while reading server settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// `APP_PORT` was not a valid port number.
    #[error("APP_PORT must be a valid u16, got '{value}'")]
    InvalidPort {
        /// The rejected value.
        value: String,
    },

    /// `APP_HOST` was neither `localhost` nor an IP address.
    #[error("APP_HOST must parse to an IPv4 or IPv6 address, got '{value}'")]
    InvalidHost {
        /// The rejected value.
        value: String,
        /// The underlying parse failure.
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Where the server binds, which policy it serves, and how loudly it logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Bind host (`localhost` or an IP address).
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Policy directory; `None` serves the built-in legacy policy.
    pub policy_dir: Option<PathBuf>,
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset.
    pub log_level: String,
}

impl ServerSettings {
    /// Reads settings from the process environment, honoring a `.env` file.
    ///
    /// Recognized variables: `APP_HOST`, `APP_PORT`, `APP_POLICY_DIR` and
    /// `APP_LOG_LEVEL`.
    pub fn from_env() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("APP_PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| SettingsError::InvalidPort { value })?,
            None => DEFAULT_PORT,
        };
        let policy_dir = lookup("APP_POLICY_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);
        let log_level = lookup("APP_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            host,
            port,
            policy_dir,
            log_level,
        })
    }

    /// Resolves the bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr, SettingsError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| SettingsError::InvalidHost {
                value: self.host.clone(),
                source,
            })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            policy_dir: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}
