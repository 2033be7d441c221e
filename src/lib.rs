//! Travel Reimbursement Engine
//!
//! This crate reproduces a legacy travel-expense reimbursement policy. Given a
//! trip's duration, miles and receipt total it computes the payout together
//! with an audit trace of every rule that fired.
//!
//! ```
//! use reimbursement_engine::calculation::reimburse;
//! use rust_decimal::Decimal;
//!
//! let amount = reimburse(5, Decimal::new(200, 0), Decimal::new(700, 0)).unwrap();
//! assert_eq!(amount.to_string(), "796.60");
//! ```

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod telemetry;
