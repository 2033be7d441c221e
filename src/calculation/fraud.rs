//! Known fraud patterns.
//!
//! Each pattern is a literal set of inclusive ranges over the trip inputs,
//! matched against historical anomalous submissions. The ranges are kept
//! exactly as observed and are never widened or generalized.

use rust_decimal::Decimal;
use tracing::warn;

use super::rule_table::dec;
use super::tiers::TierContext;
use crate::models::{AuditStep, AuditWarning, TripInput};

/// Warning code attached to every fraud-pattern match.
pub const KNOWN_FRAUD_PATTERN: &str = "KNOWN_FRAUD_PATTERN";

/// What happens to a trip that matches a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FraudAction {
    /// Multiply the running amount by `factor`.
    Penalty {
        /// The penalty multiplier.
        factor: Decimal,
    },
    /// Replace the amount with `mileage × mileage_factor + flat`.
    MileageOverride {
        /// Share of the mileage reimbursement that is kept.
        mileage_factor: Decimal,
        /// Flat amount added to the kept mileage.
        flat: Decimal,
    },
}

/// A literal range predicate over the trip inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FraudPattern {
    /// Stable identifier used in audit output.
    pub code: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Inclusive trip-length range.
    pub days: (u32, u32),
    /// Inclusive miles range.
    pub miles: (Decimal, Decimal),
    /// Inclusive receipt-total range.
    pub receipts: (Decimal, Decimal),
    /// Receipts per day must be strictly above this, when set.
    pub receipts_per_day_above: Option<Decimal>,
    /// Consequence of a match.
    pub action: FraudAction,
}

/// Every known pattern, checked in order.
pub static KNOWN_FRAUD_PATTERNS: &[FraudPattern] = &[
    FraudPattern {
        code: "single_day_mileage_receipts_spike",
        name: "Single-day mileage and receipts spike",
        days: (1, 1),
        miles: (dec(1070, 0), dec(1090, 0)),
        receipts: (dec(1800, 0), dec(1820, 0)),
        receipts_per_day_above: None,
        action: FraudAction::MileageOverride {
            mileage_factor: dec(3, 1),
            flat: dec(100, 0),
        },
    },
    FraudPattern {
        code: "vacation_padded_receipts",
        name: "Vacation with padded receipts",
        days: (8, 9),
        miles: (dec(790, 0), dec(800, 0)),
        receipts: (dec(1600, 0), dec(1700, 0)),
        receipts_per_day_above: Some(dec(200, 0)),
        action: FraudAction::Penalty { factor: dec(40, 2) },
    },
];

impl FraudPattern {
    /// Tests a trip against this pattern.
    pub fn matches(&self, trip: &TripInput, receipts_per_day: Decimal) -> bool {
        let within = |value: Decimal, (low, high): (Decimal, Decimal)| low <= value && value <= high;

        (self.days.0..=self.days.1).contains(&trip.duration_days)
            && within(trip.miles_traveled, self.miles)
            && within(trip.receipts_amount, self.receipts)
            && self
                .receipts_per_day_above
                .is_none_or(|threshold| receipts_per_day > threshold)
    }

    /// Builds the warning recorded when this pattern matches.
    pub fn warning(&self) -> AuditWarning {
        AuditWarning {
            code: KNOWN_FRAUD_PATTERN.to_string(),
            message: format!("Trip matches known fraud pattern '{}'", self.name),
            severity: "high".to_string(),
        }
    }
}

/// Returns every known pattern the trip matches.
pub fn matching_patterns(
    trip: &TripInput,
    receipts_per_day: Decimal,
) -> impl Iterator<Item = &'static FraudPattern> + '_ {
    KNOWN_FRAUD_PATTERNS
        .iter()
        .filter(move |pattern| pattern.matches(trip, receipts_per_day))
}

/// Returns the first single-day override pattern the trip matches.
pub fn find_mileage_override(
    trip: &TripInput,
    receipts_per_day: Decimal,
) -> Option<&'static FraudPattern> {
    matching_patterns(trip, receipts_per_day)
        .find(|pattern| matches!(pattern.action, FraudAction::MileageOverride { .. }))
}

/// The result of screening a multi-day amount for fraud patterns.
#[derive(Debug, Clone)]
pub struct FraudScreenResult {
    /// The amount after penalties.
    pub amount: Decimal,
    /// Product of the penalty factors that applied (1 when none).
    pub penalty_factor: Decimal,
    /// Codes of the patterns that matched.
    pub matched: Vec<&'static str>,
    /// Warnings for each match.
    pub warnings: Vec<AuditWarning>,
    /// The audit step recording the screen.
    pub audit_step: AuditStep,
}

/// Applies the penalty of every matching multi-day pattern.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::{apply_fraud_penalties, TierContext};
/// use reimbursement_engine::models::TripInput;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let trip = TripInput::new(8, Decimal::new(795, 0), Decimal::from_str("1645.99").unwrap()).unwrap();
/// let tiers = TierContext::classify(&trip);
///
/// let result = apply_fraud_penalties(Decimal::new(1000, 0), &trip, &tiers, 9);
/// assert_eq!(result.penalty_factor, Decimal::new(40, 2));
/// assert_eq!(result.amount, Decimal::new(400, 0));
/// ```
pub fn apply_fraud_penalties(
    amount: Decimal,
    trip: &TripInput,
    tiers: &TierContext,
    step_number: u32,
) -> FraudScreenResult {
    let mut penalty_factor = Decimal::ONE;
    let mut matched = Vec::new();
    let mut warnings = Vec::new();

    for pattern in matching_patterns(trip, tiers.receipts_per_day) {
        if let FraudAction::Penalty { factor } = pattern.action {
            warn!(
                pattern = pattern.code,
                duration_days = trip.duration_days,
                miles = %trip.miles_traveled,
                receipts = %trip.receipts_amount,
                "Trip matched known fraud pattern"
            );
            penalty_factor *= factor;
            matched.push(pattern.code);
            warnings.push(pattern.warning());
        }
    }

    let penalized = amount * penalty_factor;

    let reasoning = if matched.is_empty() {
        "No known fraud pattern matched".to_string()
    } else {
        format!(
            "Matched {}: ${} x {} = ${}",
            matched.join(", "),
            amount.normalize(),
            penalty_factor.normalize(),
            penalized.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "fraud_screen".to_string(),
        rule_name: "Known Fraud Pattern Screen".to_string(),
        input: serde_json::json!({
            "amount": amount.normalize().to_string(),
            "receipts_per_day": tiers.receipts_per_day.normalize().to_string()
        }),
        output: serde_json::json!({
            "matched": matched,
            "penalty_factor": penalty_factor.normalize().to_string(),
            "amount": penalized.normalize().to_string()
        }),
        reasoning,
    };

    FraudScreenResult {
        amount: penalized,
        penalty_factor,
        matched,
        warnings,
        audit_step,
    }
}
