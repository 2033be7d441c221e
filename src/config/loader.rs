//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading a
//! reimbursement policy from a directory of YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{PolicyConfig, PolicyMetadata, RatesConfig};

/// Loads and provides access to a reimbursement policy.
///
/// # Directory Structure
///
/// ```text
/// config/legacy/
/// ├── policy.yaml   # Policy metadata
/// └── rates.yaml    # Per diem, mileage bands, floor, caps and bonuses
/// ```
///
/// # Example
///
/// ```no_run
/// use reimbursement_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/legacy").unwrap();
/// println!("Loaded policy: {}", loader.policy().name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PolicyConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if a required file is missing, contains invalid
    /// YAML, or describes an unusable policy (see [`PolicyConfig::new`]).
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<PolicyMetadata>(&path.join("policy.yaml"))?;
        let rates = Self::load_yaml::<RatesConfig>(&path.join("rates.yaml"))?;

        let config = PolicyConfig::new(metadata, rates)?;
        debug!(
            path = %path.display(),
            policy = %config.policy().code,
            version = %config.policy().version,
            "Loaded reimbursement policy"
        );

        Ok(Self { config })
    }

    /// Wraps the built-in legacy policy without touching the filesystem.
    pub fn legacy() -> Self {
        Self {
            config: PolicyConfig::legacy(),
        }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying policy configuration.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Returns the policy metadata.
    pub fn policy(&self) -> &PolicyMetadata {
        self.config.policy()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::legacy()
    }
}
