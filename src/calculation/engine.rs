//! Reimbursement orchestration.
//!
//! Runs the full pipeline for one trip: validate, classify, dispatch on the
//! calculation path, enforce the floor, then round.

use rust_decimal::Decimal;
use tracing::debug;

use super::base_amount::calculate_base_amount;
use super::bonuses::apply_bonuses;
use super::floor::{apply_floor, round_final_amount};
use super::fraud::apply_fraud_penalties;
use super::multipliers::apply_multipliers;
use super::single_day::calculate_single_day;
use super::tiers::{TierContext, classify_trip};
use crate::config::{PolicyConfig, RatesConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, CalculationPath, ReimbursementBreakdown,
    ReimbursementResult, TripInput,
};

/// Largest miles or receipts value the engine accepts.
///
/// Keeps every intermediate product far inside `Decimal`'s range.
pub fn max_supported_input() -> Decimal {
    Decimal::new(1_000_000_000_000_000, 0)
}

/// Amount produced by a calculation path before the floor.
struct PathOutcome {
    amount: Decimal,
    breakdown: ReimbursementBreakdown,
    audit_steps: Vec<AuditStep>,
    warnings: Vec<AuditWarning>,
}

fn next_step(steps: &[AuditStep]) -> u32 {
    steps.len() as u32 + 1
}

fn ensure_supported(trip: &TripInput) -> EngineResult<()> {
    let limit = max_supported_input();
    if trip.miles_traveled > limit {
        return Err(EngineError::CalculationError {
            message: format!(
                "miles_traveled {} exceeds the supported maximum of {}",
                trip.miles_traveled, limit
            ),
        });
    }
    if trip.receipts_amount > limit {
        return Err(EngineError::CalculationError {
            message: format!(
                "total_receipts_amount {} exceeds the supported maximum of {}",
                trip.receipts_amount, limit
            ),
        });
    }
    Ok(())
}

fn single_day_path(trip: &TripInput, rates: &RatesConfig, first_step: u32) -> PathOutcome {
    let result = calculate_single_day(trip, rates, first_step);

    PathOutcome {
        amount: result.amount,
        breakdown: ReimbursementBreakdown {
            mileage: result.mileage,
            per_diem: Decimal::ZERO,
            receipt_based: Decimal::ZERO,
            lodging: result.allowance,
            base_amount: result.mileage + result.allowance,
            multiplier: Decimal::ONE,
            bonuses: result.mileage_bonus,
            penalty_factor: Decimal::ONE,
            floor: Decimal::ZERO,
            unrounded_amount: Decimal::ZERO,
        },
        audit_steps: result.audit_steps,
        warnings: result.warnings,
    }
}

fn multi_day_path(
    trip: &TripInput,
    tiers: &TierContext,
    rates: &RatesConfig,
    first_step: u32,
) -> PathOutcome {
    let mut audit_steps = Vec::new();

    let base = calculate_base_amount(trip, tiers, rates, first_step);
    audit_steps.extend(base.audit_steps);
    debug!(
        mileage = %base.mileage,
        per_diem = %base.per_diem,
        receipt_based = %base.receipt_based,
        base_amount = %base.base_amount,
        "Base amount computed"
    );

    let multiplied = apply_multipliers(
        base.base_amount,
        trip,
        tiers,
        first_step + audit_steps.len() as u32,
    );
    audit_steps.extend(multiplied.audit_steps);

    let bonuses = apply_bonuses(
        multiplied.amount,
        trip,
        rates,
        first_step + audit_steps.len() as u32,
    );
    audit_steps.extend(bonuses.audit_steps);
    debug!(
        mileage_bonus = %bonuses.mileage_bonus,
        cents_bonus = %bonuses.cents_bonus,
        amount = %bonuses.amount,
        "Bonuses added"
    );

    let screened = apply_fraud_penalties(
        bonuses.amount,
        trip,
        tiers,
        first_step + audit_steps.len() as u32,
    );
    audit_steps.push(screened.audit_step);

    PathOutcome {
        amount: screened.amount,
        breakdown: ReimbursementBreakdown {
            mileage: base.mileage,
            per_diem: base.per_diem,
            receipt_based: base.receipt_based,
            lodging: base.lodging,
            base_amount: base.base_amount,
            multiplier: multiplied.multiplier,
            bonuses: bonuses.total,
            penalty_factor: screened.penalty_factor,
            floor: Decimal::ZERO,
            unrounded_amount: Decimal::ZERO,
        },
        audit_steps,
        warnings: screened.warnings,
    }
}

/// Calculates the reimbursement for a trip under a policy.
///
/// # Errors
///
/// Returns [`EngineError::InvalidTrip`] for zero days or negative miles or
/// receipts, and [`EngineError::CalculationError`] for inputs above
/// [`max_supported_input`].
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::calculate_reimbursement;
/// use reimbursement_engine::config::PolicyConfig;
/// use reimbursement_engine::models::{CalculationPath, TripInput};
/// use rust_decimal::Decimal;
///
/// let trip = TripInput::new(5, Decimal::new(200, 0), Decimal::new(700, 0)).unwrap();
/// let result = calculate_reimbursement(&trip, &PolicyConfig::legacy()).unwrap();
///
/// assert_eq!(result.path, CalculationPath::MultiDay);
/// assert_eq!(result.amount.to_string(), "796.60");
/// ```
pub fn calculate_reimbursement(
    trip: &TripInput,
    policy: &PolicyConfig,
) -> EngineResult<ReimbursementResult> {
    trip.validate()?;
    ensure_supported(trip)?;

    let rates = policy.rates();
    let classification = classify_trip(trip, 1);
    let tiers = classification.tiers;
    let mut audit_steps = vec![classification.audit_step];

    let path = CalculationPath::for_duration(trip.duration_days);
    debug!(
        duration_days = trip.duration_days,
        miles = %trip.miles_traveled,
        receipts = %trip.receipts_amount,
        ?path,
        duration_tier = ?tiers.duration,
        efficiency = ?tiers.efficiency,
        "Trip classified"
    );

    let outcome = match path {
        CalculationPath::SingleDay => single_day_path(trip, rates, next_step(&audit_steps)),
        CalculationPath::MultiDay => {
            multi_day_path(trip, &tiers, rates, next_step(&audit_steps))
        }
    };
    audit_steps.extend(outcome.audit_steps);

    let floored = apply_floor(
        outcome.amount,
        trip,
        rates.floor_rate,
        next_step(&audit_steps),
    );
    audit_steps.push(floored.audit_step);

    let rounded = round_final_amount(floored.amount, next_step(&audit_steps));
    audit_steps.push(rounded.audit_step);

    debug!(
        amount = %rounded.amount,
        floor_applied = floored.floor_applied,
        "Reimbursement calculated"
    );

    Ok(ReimbursementResult {
        input: *trip,
        path,
        tiers,
        breakdown: ReimbursementBreakdown {
            floor: floored.floor,
            unrounded_amount: floored.amount,
            ..outcome.breakdown
        },
        amount: rounded.amount,
        audit_trace: AuditTrace {
            steps: audit_steps,
            warnings: outcome.warnings,
        },
    })
}

/// Calculates an amount from raw inputs under the built-in legacy policy.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::reimburse;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let amount = reimburse(3, Decimal::new(300, 0), Decimal::from_str("200.99").unwrap()).unwrap();
/// assert_eq!(amount.to_string(), "448.00");
///
/// assert!(reimburse(0, Decimal::ZERO, Decimal::ZERO).is_err());
/// ```
pub fn reimburse(duration_days: i64, miles: Decimal, receipts: Decimal) -> EngineResult<Decimal> {
    let trip = TripInput::new(duration_days, miles, receipts)?;
    calculate_reimbursement(&trip, &PolicyConfig::legacy()).map(|result| result.amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn calculate(days: i64, miles: &str, receipts: &str) -> ReimbursementResult {
        let trip = TripInput::new(days, dec(miles), dec(receipts)).unwrap();
        calculate_reimbursement(&trip, &PolicyConfig::legacy()).unwrap()
    }

    fn amount(days: i64, miles: &str, receipts: &str) -> String {
        calculate(days, miles, receipts).amount.to_string()
    }

    // ==========================================================================
    // Reference trips
    // ==========================================================================

    /// EN-001: sweet-spot receipts with the five-day length bonus.
    #[test]
    fn test_sweet_spot_five_day_trip() {
        let result = calculate(5, "200", "700.00");

        assert_eq!(result.breakdown.receipt_based, dec("595"));
        assert_eq!(result.breakdown.base_amount, dec("693"));
        assert_eq!(result.amount.to_string(), "796.60");
    }

    /// EN-002: single-day fraud override.
    #[test]
    fn test_single_day_fraud_pattern() {
        let result = calculate(1, "1080", "1810.00");

        assert_eq!(result.path, CalculationPath::SingleDay);
        assert_eq!(result.amount.to_string(), "208.90");
        assert_eq!(result.audit_trace.warnings.len(), 1);
        assert_eq!(result.audit_trace.warnings[0].code, "KNOWN_FRAUD_PATTERN");
    }

    /// EN-003: multi-day fraud penalty applies after bonuses.
    #[test]
    fn test_vacation_fraud_pattern() {
        let result = calculate(8, "795", "1645.99");

        assert_eq!(result.breakdown.penalty_factor, dec("0.40"));
        assert_eq!(result.breakdown.bonuses, dec("130"));
        assert_eq!(result.amount.to_string(), "630.15");
        assert_eq!(result.audit_trace.warnings[0].code, "KNOWN_FRAUD_PATTERN");
    }

    #[test]
    fn test_reference_amounts() {
        let cases = [
            (3, "300", "200.00", "438.00"),
            (2, "360", "100", "378.29"),
            (2, "359.98", "100", "350.77"),
            (8, "2400", "800", "2008.93"),
            (5, "900", "450", "1288.76"),
            (3, "180", "200", "370.50"),
            (14, "1000", "2000", "2244.97"),
            (10, "1192", "23.47", "1197.59"),
            (11, "1149", "270.81", "1211.77"),
            (4, "800", "400", "920.42"),
            (6, "700", "900", "1458.88"),
            (12, "600", "1800", "1557.65"),
            (9, "500", "1350", "1594.76"),
            (7, "1200", "1000", "1942.76"),
        ];
        for (days, miles, receipts, expected) in cases {
            assert_eq!(
                amount(days, miles, receipts),
                expected,
                "({}, {}, {})",
                days,
                miles,
                receipts
            );
        }
    }

    // ==========================================================================
    // Boundaries
    // ==========================================================================

    /// EN-010: $600.00 lands in the sweet spot, one cent less does not.
    #[test]
    fn test_sweet_spot_boundary() {
        assert_eq!(amount(2, "100", "600.00"), "461.36");
        assert_eq!(amount(2, "100", "599.99"), "422.62");
    }

    /// EN-011: cents ending in .99 add exactly $10.
    #[test]
    fn test_cents_bonus_adds_ten() {
        assert_eq!(amount(3, "300", "200.00"), "438.00");
        assert_eq!(amount(3, "300", "200.99"), "448.00");
    }

    /// EN-012: 180 miles/day is optimal efficiency.
    #[test]
    fn test_efficiency_boundary() {
        let result = calculate(2, "360", "100");
        assert_eq!(result.breakdown.multiplier, dec("1.045"));
    }

    // ==========================================================================
    // Single-day path
    // ==========================================================================

    #[test]
    fn test_single_day_amounts() {
        assert_eq!(amount(1, "300", "150"), "338.00");
        assert_eq!(amount(1, "5000", "2000"), "1500.00");
        assert_eq!(amount(1, "0", "0"), "100.00");
        // .49 cents earn nothing on a single day
        assert_eq!(amount(1, "50", "5.49"), "129.00");
    }

    #[test]
    fn test_single_day_breakdown() {
        let result = calculate(1, "300", "150");

        assert_eq!(result.breakdown.mileage, dec("138"));
        assert_eq!(result.breakdown.lodging, dec("200"));
        assert_eq!(result.breakdown.multiplier, dec("1"));
        assert_eq!(result.breakdown.floor, dec("50"));
    }

    #[test]
    fn test_single_day_allowance_edges_end_to_end() {
        // 300 miles pay $138 of mileage, 900 miles pay $318
        assert_eq!(amount(1, "300", "299.99"), "338.00");
        assert_eq!(amount(1, "300", "400"), "538.00");
        assert_eq!(amount(1, "300", "400.01"), "738.00");
        assert_eq!(amount(1, "300", "700"), "738.00");
        assert_eq!(amount(1, "300", "700.01"), "938.00");
        assert_eq!(amount(1, "900", "99.99"), "768.00");
        assert_eq!(amount(1, "900", "200"), "568.00");
    }

    // ==========================================================================
    // Floor
    // ==========================================================================

    #[test]
    fn test_floor_never_binds_for_plain_trips() {
        let result = calculate(2, "100", "0");
        assert_eq!(result.amount.to_string(), "221.20");
        assert!(result.amount >= result.breakdown.floor);
    }

    #[test]
    fn test_floor_binds_after_heavy_penalty() {
        let policy = PolicyConfig::legacy();
        let mut rates = policy.rates().clone();
        rates.floor_rate = dec("500");
        let policy = PolicyConfig::new(policy.policy().clone(), rates).unwrap();

        let trip = TripInput::new(3, dec("10"), dec("10")).unwrap();
        let result = calculate_reimbursement(&trip, &policy).unwrap();

        assert_eq!(result.amount.to_string(), "1500.00");
        let floor = result.audit_trace.step("payout_floor").unwrap();
        assert_eq!(floor.output["floor_applied"], true);
    }

    // ==========================================================================
    // Audit trace
    // ==========================================================================

    #[test]
    fn test_multi_day_trace_order() {
        let result = calculate(5, "200", "700");

        assert_eq!(
            result.audit_trace.rule_ids(),
            vec![
                "tier_classification",
                "mileage_reimbursement",
                "receipt_reimbursement",
                "base_amount",
                "efficiency_multiplier",
                "length_multiplier",
                "spending_multiplier",
                "mileage_bonus",
                "receipt_cents_bonus",
                "fraud_screen",
                "payout_floor",
                "currency_rounding"
            ]
        );
        let numbers: Vec<u32> = result
            .audit_trace
            .steps
            .iter()
            .map(|s| s.step_number)
            .collect();
        assert_eq!(numbers, (1..=12).collect::<Vec<u32>>());
    }

    #[test]
    fn test_single_day_trace_order() {
        let result = calculate(1, "300", "150");

        assert_eq!(
            result.audit_trace.rule_ids(),
            vec![
                "tier_classification",
                "mileage_reimbursement",
                "single_day_allowance",
                "mileage_bonus",
                "single_day_cap",
                "payout_floor",
                "currency_rounding"
            ]
        );
    }

    #[test]
    fn test_results_are_deterministic() {
        assert_eq!(calculate(9, "500", "1350"), calculate(9, "500", "1350"));
    }

    // ==========================================================================
    // Errors
    // ==========================================================================

    #[test]
    fn test_zero_day_literal_rejected() {
        let trip = TripInput {
            duration_days: 0,
            miles_traveled: dec("10"),
            receipts_amount: dec("10"),
        };
        let result = calculate_reimbursement(&trip, &PolicyConfig::legacy());
        assert!(matches!(result, Err(EngineError::InvalidTrip { .. })));
    }

    #[test]
    fn test_oversized_input_rejected() {
        let trip = TripInput::new(3, dec("1000000000000000.01"), dec("10")).unwrap();
        let result = calculate_reimbursement(&trip, &PolicyConfig::legacy());

        match result {
            Err(EngineError::CalculationError { message }) => {
                assert!(message.contains("miles_traveled"))
            }
            other => panic!("Expected CalculationError, got {:?}", other),
        }
    }

    #[test]
    fn test_reimburse_rejects_negative_receipts() {
        let result = reimburse(3, dec("100"), dec("-1"));
        assert!(matches!(result, Err(EngineError::InvalidTrip { .. })));
    }
}
