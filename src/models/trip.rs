//! Trip input model and derived per-day metrics.
//!
//! This module defines the [`TripInput`] struct that carries the three
//! scalar inputs to the engine, and the [`DerivedMetrics`] computed from it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The three scalar inputs describing a business trip.
///
/// Field names serialize using the legacy argument names
/// (`trip_duration_days`, `miles_traveled`, `total_receipts_amount`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripInput {
    /// Trip length in whole days. Must be at least 1.
    #[serde(rename = "trip_duration_days")]
    pub duration_days: u32,
    /// Total miles driven over the trip.
    pub miles_traveled: Decimal,
    /// Total of all submitted receipts, in currency units.
    #[serde(rename = "total_receipts_amount")]
    pub receipts_amount: Decimal,
}

impl TripInput {
    /// Creates a validated trip.
    ///
    /// The duration is accepted as a signed integer so that callers parsing
    /// untrusted input can hand over negative values and receive a domain
    /// error instead of a parse failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use reimbursement_engine::models::TripInput;
    /// use rust_decimal::Decimal;
    ///
    /// let trip = TripInput::new(5, Decimal::new(200, 0), Decimal::new(70000, 2)).unwrap();
    /// assert_eq!(trip.duration_days, 5);
    ///
    /// assert!(TripInput::new(-1, Decimal::ZERO, Decimal::ZERO).is_err());
    /// ```
    pub fn new(
        duration_days: i64,
        miles_traveled: Decimal,
        receipts_amount: Decimal,
    ) -> EngineResult<Self> {
        if duration_days < 1 {
            return Err(EngineError::invalid_trip(
                "trip_duration_days",
                format!("must be at least 1, got {}", duration_days),
            ));
        }
        let duration_days = u32::try_from(duration_days).map_err(|_| {
            EngineError::invalid_trip(
                "trip_duration_days",
                format!("exceeds maximum of {}, got {}", u32::MAX, duration_days),
            )
        })?;

        let trip = Self {
            duration_days,
            miles_traveled,
            receipts_amount,
        };
        trip.validate()?;
        Ok(trip)
    }

    /// Checks the input domain.
    ///
    /// Trips built through struct literals or deserialization bypass
    /// [`TripInput::new`], so the engine calls this before classifying.
    pub fn validate(&self) -> EngineResult<()> {
        if self.duration_days < 1 {
            return Err(EngineError::invalid_trip(
                "trip_duration_days",
                "must be at least 1, got 0",
            ));
        }
        if self.miles_traveled.is_sign_negative() && !self.miles_traveled.is_zero() {
            return Err(EngineError::invalid_trip(
                "miles_traveled",
                format!("must not be negative, got {}", self.miles_traveled),
            ));
        }
        if self.receipts_amount.is_sign_negative() && !self.receipts_amount.is_zero() {
            return Err(EngineError::invalid_trip(
                "total_receipts_amount",
                format!("must not be negative, got {}", self.receipts_amount),
            ));
        }
        Ok(())
    }

    /// Returns the trip length as a `Decimal` for rate arithmetic.
    pub fn days(&self) -> Decimal {
        Decimal::from(self.duration_days)
    }

    /// Computes the per-day metrics for this trip.
    ///
    /// Only meaningful for a validated trip, where `duration_days >= 1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use reimbursement_engine::models::TripInput;
    /// use rust_decimal::Decimal;
    ///
    /// let trip = TripInput::new(4, Decimal::new(800, 0), Decimal::new(400, 0)).unwrap();
    /// let metrics = trip.metrics();
    /// assert_eq!(metrics.miles_per_day, Decimal::new(200, 0));
    /// assert_eq!(metrics.receipts_per_day, Decimal::new(100, 0));
    /// ```
    pub fn metrics(&self) -> DerivedMetrics {
        let days = self.days().max(Decimal::ONE);
        DerivedMetrics {
            miles_per_day: self.miles_traveled / days,
            receipts_per_day: self.receipts_amount / days,
        }
    }
}

/// Per-day ratios derived from a [`TripInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// `miles_traveled / duration_days`.
    pub miles_per_day: Decimal,
    /// `receipts_amount / duration_days`.
    pub receipts_per_day: Decimal,
}
