//! Payout floor and currency rounding.
//!
//! The floor is applied last, after every multiplier, bonus and penalty,
//! so no adjustment can push a trip below `days × floor rate`.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{AuditStep, TripInput};

/// Rounds an amount to cents, with halves rounded away from zero.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::round_currency;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_currency(Decimal::from_str("796.6035").unwrap()).to_string(), "796.60");
/// assert_eq!(round_currency(Decimal::from_str("0.125").unwrap()).to_string(), "0.13");
/// assert_eq!(round_currency(Decimal::new(100, 0)).to_string(), "100.00");
/// ```
pub fn round_currency(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// The result of applying the payout floor.
#[derive(Debug, Clone)]
pub struct FloorResult {
    /// `max(amount, floor)`.
    pub amount: Decimal,
    /// `days × floor rate`.
    pub floor: Decimal,
    /// Whether the floor raised the amount.
    pub floor_applied: bool,
    /// The audit step recording this decision.
    pub audit_step: AuditStep,
}

/// Clamps an amount to the per-day floor.
pub fn apply_floor(
    amount: Decimal,
    trip: &TripInput,
    floor_rate: Decimal,
    step_number: u32,
) -> FloorResult {
    let floor = trip.days() * floor_rate;
    let floor_applied = amount < floor;
    let result = amount.max(floor);

    let audit_step = AuditStep {
        step_number,
        rule_id: "payout_floor".to_string(),
        rule_name: "Payout Floor".to_string(),
        input: serde_json::json!({
            "amount": amount.normalize().to_string(),
            "trip_duration_days": trip.duration_days,
            "floor_rate": floor_rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "floor": floor.normalize().to_string(),
            "floor_applied": floor_applied,
            "amount": result.normalize().to_string()
        }),
        reasoning: if floor_applied {
            format!(
                "${} is below the ${} floor ({} days x ${})",
                amount.normalize(),
                floor.normalize(),
                trip.duration_days,
                floor_rate.normalize()
            )
        } else {
            format!(
                "${} meets the ${} floor",
                amount.normalize(),
                floor.normalize()
            )
        },
    };

    FloorResult {
        amount: result,
        floor,
        floor_applied,
        audit_step,
    }
}

/// The result of rounding to currency precision.
#[derive(Debug, Clone)]
pub struct RoundingResult {
    /// The rounded amount, always with two decimal places.
    pub amount: Decimal,
    /// The audit step recording the rounding.
    pub audit_step: AuditStep,
}

/// Rounds the final amount and records it.
pub fn round_final_amount(amount: Decimal, step_number: u32) -> RoundingResult {
    let rounded = round_currency(amount);

    let audit_step = AuditStep {
        step_number,
        rule_id: "currency_rounding".to_string(),
        rule_name: "Currency Rounding".to_string(),
        input: serde_json::json!({
            "amount": amount.normalize().to_string()
        }),
        output: serde_json::json!({
            "amount": rounded.to_string()
        }),
        reasoning: format!(
            "${} rounded half-up to ${}",
            amount.normalize(),
            rounded
        ),
    };

    RoundingResult {
        amount: rounded,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn trip(days: i64) -> TripInput {
        TripInput::new(days, Decimal::ZERO, Decimal::ZERO).unwrap()
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_currency(dec("1.005")), dec("1.01"));
        assert_eq!(round_currency(dec("1.0049999")), dec("1.00"));
        assert_eq!(round_currency(dec("208.9")), dec("208.90"));
    }

    #[test]
    fn test_round_always_two_places() {
        assert_eq!(round_currency(dec("1500")).to_string(), "1500.00");
        assert_eq!(round_currency(dec("461.3625")).to_string(), "461.36");
        assert_eq!(round_currency(dec("0")).to_string(), "0.00");
    }

    #[test]
    fn test_floor_raises_low_amount() {
        let result = apply_floor(dec("120"), &trip(3), dec("50"), 12);

        assert_eq!(result.floor, dec("150"));
        assert_eq!(result.amount, dec("150"));
        assert!(result.floor_applied);
        assert_eq!(result.audit_step.rule_id, "payout_floor");
        assert_eq!(
            result.audit_step.reasoning,
            "$120 is below the $150 floor (3 days x $50)"
        );
    }

    #[test]
    fn test_floor_leaves_higher_amount() {
        let result = apply_floor(dec("438"), &trip(3), dec("50"), 12);

        assert_eq!(result.amount, dec("438"));
        assert!(!result.floor_applied);
    }

    #[test]
    fn test_amount_equal_to_floor_is_not_raised() {
        let result = apply_floor(dec("100"), &trip(2), dec("50"), 12);
        assert!(!result.floor_applied);
        assert_eq!(result.amount, dec("100"));
    }

    #[test]
    fn test_round_final_amount_step() {
        let result = round_final_amount(dec("796.6035"), 14);

        assert_eq!(result.amount.to_string(), "796.60");
        assert_eq!(result.audit_step.step_number, 14);
        assert_eq!(result.audit_step.output["amount"], "796.60");
    }
}
