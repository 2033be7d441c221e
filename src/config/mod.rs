//! Configuration loading and management for the Reimbursement Engine.
//!
//! This module loads reimbursement policies from YAML files and reads the
//! server's runtime settings from the environment.
//!
//! # Example
//!
//! ```no_run
//! use reimbursement_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/legacy").unwrap();
//! println!("Loaded policy: {}", config.policy().name);
//! ```

mod loader;
mod server;
mod types;

pub use loader::ConfigLoader;
pub use server::{ServerSettings, SettingsError};
pub use types::{
    CentsBonusConfig, MAX_POLICY_AMOUNT, MileageBonusConfig, MileageBonusTier, MileageRateBand,
    PolicyConfig, PolicyMetadata, RatesConfig,
};
