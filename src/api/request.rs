//! Request types for the Reimbursement Engine API.
//!
//! This module defines the JSON request structures for the `/calculate` and
//! `/calculate/batch` endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::TripInput;

/// Request body for the `/calculate` endpoint.
///
/// The duration is signed so that a negative value reaches the engine and is
/// reported as `INVALID_TRIP` rather than as a JSON type error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRequest {
    /// Trip length in days.
    pub trip_duration_days: i64,
    /// Total miles driven.
    pub miles_traveled: Decimal,
    /// Total of submitted receipts.
    pub total_receipts_amount: Decimal,
}

/// Request body for the `/calculate/batch` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Trips to score, each independently.
    pub trips: Vec<TripRequest>,
}

impl TryFrom<TripRequest> for TripInput {
    type Error = EngineError;

    fn try_from(req: TripRequest) -> Result<Self, Self::Error> {
        TripInput::new(
            req.trip_duration_days,
            req.miles_traveled,
            req.total_receipts_amount,
        )
    }
}
