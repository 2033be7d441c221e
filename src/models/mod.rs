//! Core data models for the Reimbursement Engine.
//!
//! This module contains the trip input and the calculation result types.

mod calculation_result;
mod trip;

pub use calculation_result::{
    AuditStep, AuditTrace, AuditWarning, CalculationPath, ReimbursementBreakdown,
    ReimbursementResult,
};
pub use trip::{DerivedMetrics, TripInput};
