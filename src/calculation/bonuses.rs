//! Flat additive bonuses.
//!
//! Bonuses are added after the multipliers and are never scaled by them.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::config::{CentsBonusConfig, MileageBonusTier, RatesConfig};
use crate::models::{AuditStep, TripInput};

/// Looks up the flat bonus for a distance.
///
/// Tiers are ordered from the highest threshold down; the first threshold
/// the miles exceed wins.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::mileage_bonus;
/// use reimbursement_engine::config::PolicyConfig;
/// use rust_decimal::Decimal;
///
/// let policy = PolicyConfig::legacy();
/// let tiers = &policy.rates().mileage_bonus.multi_day;
///
/// assert_eq!(mileage_bonus(Decimal::new(1001, 0), tiers), Decimal::new(300, 0));
/// assert_eq!(mileage_bonus(Decimal::new(1000, 0), tiers), Decimal::new(200, 0));
/// assert_eq!(mileage_bonus(Decimal::new(400, 0), tiers), Decimal::ZERO);
/// ```
pub fn mileage_bonus(miles: Decimal, tiers: &[MileageBonusTier]) -> Decimal {
    tiers
        .iter()
        .find(|tier| miles > tier.above)
        .map_or(Decimal::ZERO, |tier| tier.amount)
}

/// Returns the whole cents of an amount (`0..=99`), truncating sub-cent digits.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::receipt_cents;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(receipt_cents(Decimal::from_str("200.99").unwrap()), 99);
/// assert_eq!(receipt_cents(Decimal::from_str("12.499").unwrap()), 49);
/// assert_eq!(receipt_cents(Decimal::from_str("7").unwrap()), 0);
/// ```
pub fn receipt_cents(amount: Decimal) -> u32 {
    (amount.abs().fract() * Decimal::ONE_HUNDRED)
        .trunc()
        .to_u32()
        .unwrap_or(0)
}

/// Returns the legacy rounding bonus when the receipt cents match.
pub fn receipt_cents_bonus(receipts: Decimal, config: &CentsBonusConfig) -> Decimal {
    if config.cents.contains(&receipt_cents(receipts)) {
        config.amount
    } else {
        Decimal::ZERO
    }
}

/// The result of applying the multi-day bonuses.
#[derive(Debug, Clone)]
pub struct BonusResult {
    /// Amount after the bonuses were added.
    pub amount: Decimal,
    /// High-mileage bonus.
    pub mileage_bonus: Decimal,
    /// Receipt-cents bonus.
    pub cents_bonus: Decimal,
    /// `mileage_bonus + cents_bonus`.
    pub total: Decimal,
    /// Audit steps for each bonus.
    pub audit_steps: Vec<AuditStep>,
}

/// Adds the high-mileage and receipt-cents bonuses to a multi-day amount.
pub fn apply_bonuses(
    amount: Decimal,
    trip: &TripInput,
    rates: &RatesConfig,
    step_number_start: u32,
) -> BonusResult {
    let mileage = mileage_bonus(trip.miles_traveled, &rates.mileage_bonus.multi_day);
    let cents = receipt_cents(trip.receipts_amount);
    let cents_bonus = receipt_cents_bonus(trip.receipts_amount, &rates.receipt_cents_bonus);
    let total = mileage + cents_bonus;

    let mileage_step = AuditStep {
        step_number: step_number_start,
        rule_id: "mileage_bonus".to_string(),
        rule_name: "High-Mileage Bonus".to_string(),
        input: serde_json::json!({
            "miles_traveled": trip.miles_traveled.normalize().to_string()
        }),
        output: serde_json::json!({
            "bonus": mileage.normalize().to_string()
        }),
        reasoning: if mileage.is_zero() {
            "No high-mileage bonus".to_string()
        } else {
            format!(
                "{} miles earns a ${} bonus",
                trip.miles_traveled.normalize(),
                mileage.normalize()
            )
        },
    };

    let cents_step = AuditStep {
        step_number: step_number_start + 1,
        rule_id: "receipt_cents_bonus".to_string(),
        rule_name: "Receipt Cents Bonus".to_string(),
        input: serde_json::json!({
            "total_receipts_amount": trip.receipts_amount.normalize().to_string(),
            "cents": cents
        }),
        output: serde_json::json!({
            "bonus": cents_bonus.normalize().to_string()
        }),
        reasoning: if cents_bonus.is_zero() {
            format!("Receipt cents .{:02} earn no bonus", cents)
        } else {
            format!(
                "Receipt cents .{:02} earn a ${} bonus",
                cents,
                cents_bonus.normalize()
            )
        },
    };

    BonusResult {
        amount: amount + total,
        mileage_bonus: mileage,
        cents_bonus,
        total,
        audit_steps: vec![mileage_step, cents_step],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyConfig;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn bonus_for(days: i64, miles: &str, receipts: &str) -> BonusResult {
        let trip = TripInput::new(days, dec(miles), dec(receipts)).unwrap();
        apply_bonuses(dec("1000"), &trip, PolicyConfig::legacy().rates(), 10)
    }

    #[test]
    fn test_multi_day_mileage_bonus_tiers() {
        let policy = PolicyConfig::legacy();
        let tiers = &policy.rates().mileage_bonus.multi_day;

        assert_eq!(mileage_bonus(dec("1000.01"), tiers), dec("300"));
        assert_eq!(mileage_bonus(dec("800.01"), tiers), dec("200"));
        assert_eq!(mileage_bonus(dec("800"), tiers), dec("120"));
        assert_eq!(mileage_bonus(dec("600.01"), tiers), dec("120"));
        assert_eq!(mileage_bonus(dec("600"), tiers), dec("60"));
        assert_eq!(mileage_bonus(dec("400.01"), tiers), dec("60"));
        assert_eq!(mileage_bonus(dec("400"), tiers), dec("0"));
    }

    #[test]
    fn test_single_day_bonus_caps_at_50() {
        let policy = PolicyConfig::legacy();
        let tiers = &policy.rates().mileage_bonus.single_day;

        assert_eq!(mileage_bonus(dec("5000"), tiers), dec("50"));
        assert_eq!(mileage_bonus(dec("700"), tiers), dec("30"));
        assert_eq!(mileage_bonus(dec("600"), tiers), dec("0"));
    }

    #[test]
    fn test_receipt_cents() {
        assert_eq!(receipt_cents(dec("0.49")), 49);
        assert_eq!(receipt_cents(dec("1645.99")), 99);
        assert_eq!(receipt_cents(dec("100.5")), 50);
        assert_eq!(receipt_cents(dec("100.00")), 0);
    }

    #[test]
    fn test_cents_bonus_only_for_49_and_99() {
        let config = PolicyConfig::legacy().rates().receipt_cents_bonus.clone();

        assert_eq!(receipt_cents_bonus(dec("200.49"), &config), dec("10"));
        assert_eq!(receipt_cents_bonus(dec("200.99"), &config), dec("10"));
        assert_eq!(receipt_cents_bonus(dec("200.98"), &config), dec("0"));
        assert_eq!(receipt_cents_bonus(dec("200.50"), &config), dec("0"));
    }

    #[test]
    fn test_apply_bonuses_adds_both() {
        let result = bonus_for(5, "900", "450.99");

        assert_eq!(result.mileage_bonus, dec("200"));
        assert_eq!(result.cents_bonus, dec("10"));
        assert_eq!(result.total, dec("210"));
        assert_eq!(result.amount, dec("1210"));
    }

    #[test]
    fn test_apply_bonuses_audit_steps() {
        let result = bonus_for(3, "300", "200.00");

        assert_eq!(result.amount, dec("1000"));
        assert_eq!(result.audit_steps.len(), 2);
        assert_eq!(result.audit_steps[0].rule_id, "mileage_bonus");
        assert_eq!(result.audit_steps[0].step_number, 10);
        assert_eq!(result.audit_steps[1].rule_id, "receipt_cents_bonus");
        assert_eq!(result.audit_steps[1].step_number, 11);
        assert_eq!(
            result.audit_steps[1].reasoning,
            "Receipt cents .00 earn no bonus"
        );
    }
}
