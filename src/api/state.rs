//! Application state for the Reimbursement Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::{ConfigLoader, PolicyConfig};

/// Shared application state.
///
/// Holds the policy loaded at startup. The policy is read-only, so handlers
/// share it without locking.
#[derive(Clone)]
pub struct AppState {
    /// The loaded policy configuration.
    config: Arc<ConfigLoader>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns the policy handlers calculate under.
    pub fn policy(&self) -> &PolicyConfig {
        self.config.config()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ConfigLoader::legacy())
    }
}
