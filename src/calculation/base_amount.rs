//! Multi-day base amount.
//!
//! The base amount is the tiered mileage plus the better of two lodging
//! candidates: a flat per diem or the receipt-based reimbursement.

use rust_decimal::Decimal;

use super::mileage::calculate_mileage;
use super::receipts::calculate_receipt_reimbursement;
use super::tiers::TierContext;
use crate::config::RatesConfig;
use crate::models::{AuditStep, TripInput};

/// The components of the multi-day base amount.
#[derive(Debug, Clone)]
pub struct BaseAmountResult {
    /// Tiered mileage reimbursement.
    pub mileage: Decimal,
    /// `days × per diem rate`.
    pub per_diem: Decimal,
    /// Receipt-based candidate.
    pub receipt_based: Decimal,
    /// `max(per_diem, receipt_based)`.
    pub lodging: Decimal,
    /// `mileage + lodging`.
    pub base_amount: Decimal,
    /// Audit steps for mileage, receipts and the selection.
    pub audit_steps: Vec<AuditStep>,
}

/// Computes the base amount for a multi-day trip.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::{calculate_base_amount, TierContext};
/// use reimbursement_engine::config::PolicyConfig;
/// use reimbursement_engine::models::TripInput;
/// use rust_decimal::Decimal;
///
/// let policy = PolicyConfig::legacy();
/// let trip = TripInput::new(5, Decimal::new(200, 0), Decimal::new(700, 0)).unwrap();
/// let tiers = TierContext::classify(&trip);
///
/// let result = calculate_base_amount(&trip, &tiers, policy.rates(), 2);
/// assert_eq!(result.per_diem, Decimal::new(500, 0));
/// assert_eq!(result.receipt_based, Decimal::new(595, 0));
/// assert_eq!(result.base_amount, Decimal::new(693, 0));
/// ```
pub fn calculate_base_amount(
    trip: &TripInput,
    tiers: &TierContext,
    rates: &RatesConfig,
    step_number_start: u32,
) -> BaseAmountResult {
    let mileage = calculate_mileage(trip.miles_traveled, &rates.mileage, step_number_start);
    let receipts = calculate_receipt_reimbursement(
        trip.receipts_amount,
        tiers.receipt_band,
        step_number_start + 1,
    );

    let per_diem = trip.days() * rates.per_diem_rate;
    let lodging = per_diem.max(receipts.amount);
    let base_amount = mileage.amount + lodging;
    let selected = if receipts.amount > per_diem {
        "receipts"
    } else {
        "per_diem"
    };

    let selection_step = AuditStep {
        step_number: step_number_start + 2,
        rule_id: "base_amount".to_string(),
        rule_name: "Base Amount Selection".to_string(),
        input: serde_json::json!({
            "mileage": mileage.amount.normalize().to_string(),
            "per_diem": per_diem.normalize().to_string(),
            "receipt_based": receipts.amount.normalize().to_string()
        }),
        output: serde_json::json!({
            "selected": selected,
            "lodging": lodging.normalize().to_string(),
            "base_amount": base_amount.normalize().to_string()
        }),
        reasoning: format!(
            "max(${} per diem, ${} receipts) + ${} mileage = ${}",
            per_diem.normalize(),
            receipts.amount.normalize(),
            mileage.amount.normalize(),
            base_amount.normalize()
        ),
    };

    BaseAmountResult {
        mileage: mileage.amount,
        per_diem,
        receipt_based: receipts.amount,
        lodging,
        base_amount,
        audit_steps: vec![mileage.audit_step, receipts.audit_step, selection_step],
    }
}
