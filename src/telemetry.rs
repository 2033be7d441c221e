//! Tracing subscriber setup for the binaries.
//!
//! `RUST_LOG` takes precedence; otherwise the configured level is used as the
//! filter directive. Output goes to stderr so the CLI's stdout stays a single
//! number.

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// `RUST_LOG` or the configured level could not be parsed.
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    EnvFilter {
        /// The rejected directive.
        value: String,
        /// Parser error.
        #[source]
        source: ParseError,
    },

    /// A global subscriber was already installed.
    #[error("telemetry error: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Builds the filter from `RUST_LOG`, falling back to `default_level`.
///
/// A `RUST_LOG` that is set but does not parse is an error rather than a
/// silent fallback.
pub fn env_filter(default_level: &str) -> Result<EnvFilter, TelemetryError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_from(rust_log.as_deref(), default_level)
}

/// Builds the filter from an explicit directive, or `default_level` when
/// the directive is absent or blank.
pub fn filter_from(
    directive: Option<&str>,
    default_level: &str,
) -> Result<EnvFilter, TelemetryError> {
    let value = match directive.map(str::trim) {
        Some(directive) if !directive.is_empty() => directive,
        _ => default_level,
    };
    EnvFilter::try_new(value).map_err(|source| TelemetryError::EnvFilter {
        value: value.to_string(),
        source,
    })
}

/// Installs a compact fmt subscriber writing to stderr.
pub fn init(default_level: &str) -> Result<(), TelemetryError> {
    let filter = env_filter(default_level)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_default_level_is_reported() {
        let err = filter_from(None, "engine=verbose").unwrap_err();
        assert!(matches!(err, TelemetryError::EnvFilter { ref value, .. } if value == "engine=verbose"));
        assert!(err.to_string().contains("engine=verbose"));
    }

    #[test]
    fn test_invalid_rust_log_is_reported_not_replaced() {
        let err = filter_from(Some("engine=verbose"), "warn").unwrap_err();
        assert!(matches!(err, TelemetryError::EnvFilter { ref value, .. } if value == "engine=verbose"));
    }

    #[test]
    fn test_rust_log_takes_precedence() {
        let filter = filter_from(Some("reimbursement_engine=debug"), "engine=verbose").unwrap();
        assert_eq!(filter.to_string(), "reimbursement_engine=debug");
    }

    #[test]
    fn test_blank_rust_log_uses_default() {
        let filter = filter_from(Some("  "), "warn").unwrap();
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init("warn");
        assert!(matches!(init("warn"), Err(TelemetryError::Subscriber(_))));
    }
}
