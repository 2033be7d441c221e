//! Single-day trips.
//!
//! One-day trips bypass the multi-day pipeline entirely: mileage plus a
//! flat allowance keyed on receipts, a small mileage bonus, and a hard cap.
//! A known fraud pattern replaces all of that with a reduced mileage payout.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::bonuses::mileage_bonus;
use super::fraud::{FraudAction, find_mileage_override};
use super::mileage::calculate_mileage;
use super::rule_table::{Bound, RuleRow, dec, lookup, row};
use crate::config::RatesConfig;
use crate::models::{AuditStep, AuditWarning, TripInput};

/// Flat allowance by receipt total.
///
/// Rows below $400 are closed below and open above. The $400 row is closed
/// at both ends, so every row above it is open below and closed above,
/// matching the legacy `>` comparisons for the upper bands.
pub static SINGLE_DAY_ALLOWANCE: &[RuleRow] = &[
    row(Bound::Below(dec(100, 0)), dec(100, 0), "minimal receipts"),
    row(
        Bound::Range(dec(100, 0), dec(300, 0)),
        dec(200, 0),
        "light receipts",
    ),
    row(
        Bound::Between(dec(300, 0), dec(400, 0)),
        dec(400, 0),
        "moderate receipts",
    ),
    row(
        Bound::AboveUpTo(dec(400, 0), dec(700, 0)),
        dec(600, 0),
        "elevated receipts",
    ),
    row(
        Bound::AboveUpTo(dec(700, 0), dec(1000, 0)),
        dec(800, 0),
        "high receipts",
    ),
    row(
        Bound::AboveUpTo(dec(1000, 0), dec(1500, 0)),
        dec(1000, 0),
        "very high receipts",
    ),
    row(Bound::Above(dec(1500, 0)), dec(1200, 0), "extreme receipts"),
];

/// Receipts below this count as minimal.
const MINIMAL_RECEIPTS: Decimal = dec(100, 0);
/// Miles above which a minimal-receipt day is treated as a long drive.
const LONG_DRIVE_MILES: Decimal = dec(800, 0);
/// Allowance for a long drive with minimal receipts.
const LONG_DRIVE_ALLOWANCE: Decimal = dec(400, 0);

/// Looks up the flat day allowance.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::single_day_allowance;
/// use rust_decimal::Decimal;
///
/// assert_eq!(single_day_allowance(Decimal::new(150, 0), Decimal::new(300, 0)), Decimal::new(400, 0));
/// assert_eq!(single_day_allowance(Decimal::new(900, 0), Decimal::new(50, 0)), Decimal::new(400, 0));
/// assert_eq!(single_day_allowance(Decimal::new(100, 0), Decimal::new(50, 0)), Decimal::new(100, 0));
/// ```
pub fn single_day_allowance(miles: Decimal, receipts: Decimal) -> Decimal {
    allowance_row(miles, receipts).0
}

fn allowance_row(miles: Decimal, receipts: Decimal) -> (Decimal, &'static str) {
    if receipts < MINIMAL_RECEIPTS && miles > LONG_DRIVE_MILES {
        return (LONG_DRIVE_ALLOWANCE, "minimal receipts, long drive");
    }
    lookup(SINGLE_DAY_ALLOWANCE, receipts)
        .map_or((Decimal::ZERO, "no allowance"), |r| (r.value, r.label))
}

/// The result of the single-day calculation.
#[derive(Debug, Clone)]
pub struct SingleDayResult {
    /// Tiered mileage reimbursement.
    pub mileage: Decimal,
    /// Flat day allowance (zero under a fraud override).
    pub allowance: Decimal,
    /// Single-day mileage bonus (zero under a fraud override).
    pub mileage_bonus: Decimal,
    /// Amount before the cap.
    pub uncapped: Decimal,
    /// Amount after the cap.
    pub amount: Decimal,
    /// Whether the cap lowered the amount.
    pub capped: bool,
    /// Code of the fraud pattern that overrode the calculation, if any.
    pub fraud_pattern: Option<&'static str>,
    /// Warnings raised by the calculation.
    pub warnings: Vec<AuditWarning>,
    /// Audit steps in the order they fired.
    pub audit_steps: Vec<AuditStep>,
}

/// Computes the amount for a one-day trip, before the floor and rounding.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::calculate_single_day;
/// use reimbursement_engine::config::PolicyConfig;
/// use reimbursement_engine::models::TripInput;
/// use rust_decimal::Decimal;
///
/// let trip = TripInput::new(1, Decimal::new(1080, 0), Decimal::new(1810, 0)).unwrap();
/// let result = calculate_single_day(&trip, PolicyConfig::legacy().rates(), 2);
///
/// // 363 × 0.3 + 100
/// assert_eq!(result.amount, Decimal::new(2089, 1));
/// assert_eq!(result.fraud_pattern, Some("single_day_mileage_receipts_spike"));
/// ```
pub fn calculate_single_day(
    trip: &TripInput,
    rates: &RatesConfig,
    step_number_start: u32,
) -> SingleDayResult {
    let miles = trip.miles_traveled;
    let receipts = trip.receipts_amount;
    let mileage = calculate_mileage(miles, &rates.mileage, step_number_start);
    let mut audit_steps = vec![mileage.audit_step];
    let mut warnings = Vec::new();
    let mut next_step = step_number_start + 1;

    let mut allowance = Decimal::ZERO;
    let mut bonus = Decimal::ZERO;
    let mut fraud_pattern = None;

    let matched = find_mileage_override(trip, receipts).map(|pattern| (pattern, pattern.action));

    let uncapped = if let Some((
        pattern,
        FraudAction::MileageOverride {
            mileage_factor,
            flat,
        },
    )) = matched
    {
        warn!(
            pattern = pattern.code,
            miles = %miles,
            receipts = %receipts,
            "Single-day trip matched known fraud pattern"
        );
        let amount = mileage.amount * mileage_factor + flat;
        fraud_pattern = Some(pattern.code);
        warnings.push(pattern.warning());
        audit_steps.push(AuditStep {
            step_number: next_step,
            rule_id: "fraud_screen".to_string(),
            rule_name: "Known Fraud Pattern Screen".to_string(),
            input: serde_json::json!({
                "miles_traveled": miles.normalize().to_string(),
                "total_receipts_amount": receipts.normalize().to_string()
            }),
            output: serde_json::json!({
                "matched": [pattern.code],
                "amount": amount.normalize().to_string()
            }),
            reasoning: format!(
                "Matched {}: ${} mileage x {} + ${} = ${}",
                pattern.code,
                mileage.amount.normalize(),
                mileage_factor.normalize(),
                flat.normalize(),
                amount.normalize()
            ),
        });
        next_step += 1;
        amount
    } else {
        let (day_allowance, label) = allowance_row(miles, receipts);
        allowance = day_allowance;
        audit_steps.push(AuditStep {
            step_number: next_step,
            rule_id: "single_day_allowance".to_string(),
            rule_name: "Single-Day Allowance".to_string(),
            input: serde_json::json!({
                "miles_traveled": miles.normalize().to_string(),
                "total_receipts_amount": receipts.normalize().to_string()
            }),
            output: serde_json::json!({
                "allowance": allowance.normalize().to_string(),
                "band": label
            }),
            reasoning: format!(
                "${} receipts ({}) earn a ${} allowance",
                receipts.normalize(),
                label,
                allowance.normalize()
            ),
        });
        next_step += 1;

        bonus = mileage_bonus(miles, &rates.mileage_bonus.single_day);
        audit_steps.push(AuditStep {
            step_number: next_step,
            rule_id: "mileage_bonus".to_string(),
            rule_name: "Single-Day Mileage Bonus".to_string(),
            input: serde_json::json!({
                "miles_traveled": miles.normalize().to_string()
            }),
            output: serde_json::json!({
                "bonus": bonus.normalize().to_string()
            }),
            reasoning: if bonus.is_zero() {
                "No single-day mileage bonus".to_string()
            } else {
                format!(
                    "{} miles in one day earns a ${} bonus",
                    miles.normalize(),
                    bonus.normalize()
                )
            },
        });
        next_step += 1;

        mileage.amount + allowance + bonus
    };

    let amount = uncapped.min(rates.single_day_cap);
    let capped = amount < uncapped;
    audit_steps.push(AuditStep {
        step_number: next_step,
        rule_id: "single_day_cap".to_string(),
        rule_name: "Single-Day Cap".to_string(),
        input: serde_json::json!({
            "amount": uncapped.normalize().to_string(),
            "cap": rates.single_day_cap.normalize().to_string()
        }),
        output: serde_json::json!({
            "amount": amount.normalize().to_string(),
            "capped": capped
        }),
        reasoning: if capped {
            format!(
                "${} exceeds the ${} single-day cap",
                uncapped.normalize(),
                rates.single_day_cap.normalize()
            )
        } else {
            format!(
                "${} is within the ${} single-day cap",
                uncapped.normalize(),
                rates.single_day_cap.normalize()
            )
        },
    });

    debug!(
        mileage = %mileage.amount,
        allowance = %allowance,
        bonus = %bonus,
        amount = %amount,
        capped,
        "Single-day amount computed"
    );

    SingleDayResult {
        mileage: mileage.amount,
        allowance,
        mileage_bonus: bonus,
        uncapped,
        amount,
        capped,
        fraud_pattern,
        warnings,
        audit_steps,
    }
}
