//! Receipt-based reimbursement.
//!
//! Receipts compete with the flat per diem. Low daily spending is penalized,
//! the $600-800 total band gets the most favorable rate, and totals above
//! $800 follow a continuous schedule with falling marginal rates.

use rust_decimal::Decimal;

use super::tiers::ReceiptBand;
use crate::models::AuditStep;

/// The result of a receipt-based calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct ReceiptResult {
    /// The receipt-based reimbursement candidate.
    pub amount: Decimal,
    /// The band that priced the receipts.
    pub band: ReceiptBand,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Flat rate applied to the full receipt total for the proportional bands.
pub fn receipt_rate(band: ReceiptBand) -> Option<Decimal> {
    match band {
        ReceiptBand::PenaltyLow => Some(Decimal::new(40, 2)),
        ReceiptBand::Standard => Some(Decimal::new(75, 2)),
        ReceiptBand::SweetSpot => Some(Decimal::new(85, 2)),
        ReceiptBand::Diminishing | ReceiptBand::Tapered | ReceiptBand::Residual => None,
    }
}

/// `(threshold, amount at threshold, marginal rate)` for the graduated bands.
fn graduated_schedule(band: ReceiptBand) -> Option<(Decimal, Decimal, Decimal)> {
    match band {
        ReceiptBand::Diminishing => Some((
            Decimal::new(800, 0),
            Decimal::new(680, 0),
            Decimal::new(60, 2),
        )),
        ReceiptBand::Tapered => Some((
            Decimal::new(1200, 0),
            Decimal::new(920, 0),
            Decimal::new(30, 2),
        )),
        ReceiptBand::Residual => Some((
            Decimal::new(2000, 0),
            Decimal::new(1160, 0),
            Decimal::new(10, 2),
        )),
        _ => None,
    }
}

/// Prices a receipt total within its band.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::{receipt_reimbursement, ReceiptBand};
/// use rust_decimal::Decimal;
///
/// let amount = receipt_reimbursement(Decimal::new(700, 0), ReceiptBand::SweetSpot);
/// assert_eq!(amount, Decimal::new(595, 0));
///
/// let amount = receipt_reimbursement(Decimal::new(1000, 0), ReceiptBand::Diminishing);
/// assert_eq!(amount, Decimal::new(800, 0));
/// ```
pub fn receipt_reimbursement(receipts: Decimal, band: ReceiptBand) -> Decimal {
    if let Some(rate) = receipt_rate(band) {
        return receipts * rate;
    }
    match graduated_schedule(band) {
        Some((threshold, base, marginal)) => base + (receipts - threshold) * marginal,
        None => Decimal::ZERO,
    }
}

/// Prices the receipts of a trip and records the band used.
pub fn calculate_receipt_reimbursement(
    receipts: Decimal,
    band: ReceiptBand,
    step_number: u32,
) -> ReceiptResult {
    let amount = receipt_reimbursement(receipts, band);

    let reasoning = match (receipt_rate(band), graduated_schedule(band)) {
        (Some(rate), _) => format!(
            "${} x {} = ${}",
            receipts.normalize(),
            rate.normalize(),
            amount.normalize()
        ),
        (None, Some((threshold, base, marginal))) => format!(
            "${} + (${} - ${}) x {} = ${}",
            base.normalize(),
            receipts.normalize(),
            threshold.normalize(),
            marginal.normalize(),
            amount.normalize()
        ),
        (None, None) => format!("No schedule for band {:?}", band),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "receipt_reimbursement".to_string(),
        rule_name: "Receipt-Based Reimbursement".to_string(),
        input: serde_json::json!({
            "total_receipts_amount": receipts.normalize().to_string(),
            "receipt_band": band
        }),
        output: serde_json::json!({
            "receipt_based": amount.normalize().to_string()
        }),
        reasoning,
    };

    ReceiptResult {
        amount,
        band,
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

    fn price(receipts: &str, receipts_per_day: &str) -> Decimal {
        let receipts = dec(receipts);
        let band = ReceiptBand::from_receipts(receipts, dec(receipts_per_day));
        receipt_reimbursement(receipts, band)
    }

    #[test]
    fn test_penalty_low_rate() {
        // 10 days, $300 total
        assert_eq!(price("300", "30"), dec("120.00"));
    }

    #[test]
    fn test_standard_rate() {
        assert_eq!(price("200", "66.67"), dec("150.00"));
        assert_eq!(price("599.99", "299.995"), dec("449.9925"));
    }

    #[test]
    fn test_sweet_spot_starts_at_600() {
        assert_eq!(price("600.00", "300"), dec("510.00"));
        assert_eq!(price("799.99", "160"), dec("679.9915"));
    }

    #[test]
    fn test_diminishing_band() {
        assert_eq!(price("800", "160"), dec("680"));
        assert_eq!(price("1199.99", "240"), dec("919.994"));
    }

    #[test]
    fn test_tapered_band() {
        assert_eq!(price("1200", "240"), dec("920"));
        assert_eq!(price("1645.99", "205.74875"), dec("1053.797"));
    }

    #[test]
    fn test_residual_band() {
        assert_eq!(price("2000", "400"), dec("1160"));
        assert_eq!(price("3000", "600"), dec("1260"));
    }

    /// The graduated schedule has no cliff at its thresholds.
    #[test]
    fn test_graduated_schedule_is_continuous() {
        let below = price("1999.99", "400");
        let at = price("2000", "400");
        assert_eq!(at - below, dec("0.003"));
    }

    #[test]
    fn test_audit_step_for_flat_band() {
        let result = calculate_receipt_reimbursement(dec("700"), ReceiptBand::SweetSpot, 3);

        assert_eq!(result.amount, dec("595"));
        assert_eq!(result.band, ReceiptBand::SweetSpot);
        assert_eq!(result.audit_step.rule_id, "receipt_reimbursement");
        assert_eq!(result.audit_step.input["receipt_band"], "sweet_spot");
        assert_eq!(result.audit_step.reasoning, "$700 x 0.85 = $595");
    }

    #[test]
    fn test_audit_step_for_graduated_band() {
        let result = calculate_receipt_reimbursement(dec("1000"), ReceiptBand::Diminishing, 3);

        assert_eq!(result.amount, dec("800"));
        assert_eq!(result.audit_step.reasoning, "$680 + ($1000 - $800) x 0.6 = $800");
    }
}
