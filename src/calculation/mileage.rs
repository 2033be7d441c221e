//! Tiered mileage reimbursement.
//!
//! Each band's rate applies only to the miles that fall inside the band, so
//! the reimbursement is a continuous, concave function of total miles.

use rust_decimal::Decimal;

use crate::config::MileageRateBand;
use crate::models::AuditStep;

/// The result of a mileage calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct MileageResult {
    /// The mileage reimbursement.
    pub amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes the tiered mileage reimbursement for a distance.
///
/// Bands must be ascending with an unbounded last band, which
/// [`PolicyConfig::new`](crate::config::PolicyConfig::new) guarantees.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::mileage_reimbursement;
/// use reimbursement_engine::config::PolicyConfig;
/// use rust_decimal::Decimal;
///
/// let policy = PolicyConfig::legacy();
/// let bands = &policy.rates().mileage;
///
/// // 100 × 0.58 + 400 × 0.40 + 100 × 0.25
/// assert_eq!(mileage_reimbursement(Decimal::new(600, 0), bands), Decimal::new(243, 0));
/// ```
pub fn mileage_reimbursement(miles: Decimal, bands: &[MileageRateBand]) -> Decimal {
    band_portions(miles, bands)
        .iter()
        .map(|(portion, rate)| portion * rate)
        .sum()
}

/// Splits a distance into `(miles inside band, band rate)` pairs.
fn band_portions(miles: Decimal, bands: &[MileageRateBand]) -> Vec<(Decimal, Decimal)> {
    let mut portions = Vec::with_capacity(bands.len());
    let mut lower = Decimal::ZERO;

    for band in bands {
        if miles <= lower {
            break;
        }
        let upper = band.up_to.map_or(miles, |up_to| miles.min(up_to));
        portions.push((upper - lower, band.rate));
        match band.up_to {
            Some(up_to) => lower = up_to,
            None => break,
        }
    }

    portions
}

/// Computes the mileage reimbursement and records the bands that were used.
pub fn calculate_mileage(
    miles: Decimal,
    bands: &[MileageRateBand],
    step_number: u32,
) -> MileageResult {
    let portions = band_portions(miles, bands);
    let amount: Decimal = portions.iter().map(|(portion, rate)| portion * rate).sum();

    let reasoning = if portions.is_empty() {
        "No miles traveled".to_string()
    } else {
        let terms: Vec<String> = portions
            .iter()
            .map(|(portion, rate)| format!("{} mi x ${}", portion.normalize(), rate.normalize()))
            .collect();
        format!("{} = ${}", terms.join(" + "), amount.normalize())
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "mileage_reimbursement".to_string(),
        rule_name: "Tiered Mileage Reimbursement".to_string(),
        input: serde_json::json!({
            "miles_traveled": miles.normalize().to_string(),
            "bands": bands.len()
        }),
        output: serde_json::json!({
            "mileage": amount.normalize().to_string()
        }),
        reasoning,
    };

    MileageResult { amount, audit_step }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyConfig;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn legacy_bands() -> Vec<MileageRateBand> {
        PolicyConfig::legacy().rates().mileage.clone()
    }

    /// Zero miles reimburse nothing.
    #[test]
    fn test_zero_miles() {
        assert_eq!(mileage_reimbursement(Decimal::ZERO, &legacy_bands()), dec("0"));
    }

    /// The first band pays $0.58 per mile.
    #[test]
    fn test_first_band_only() {
        assert_eq!(mileage_reimbursement(dec("50"), &legacy_bands()), dec("29.00"));
        assert_eq!(mileage_reimbursement(dec("100"), &legacy_bands()), dec("58.00"));
    }

    /// The second band pays $0.40 per mile on miles 100 to 500.
    #[test]
    fn test_second_band() {
        assert_eq!(mileage_reimbursement(dec("200"), &legacy_bands()), dec("98.00"));
        assert_eq!(mileage_reimbursement(dec("500"), &legacy_bands()), dec("218.00"));
    }

    /// Miles above 500 pay $0.25 each.
    #[test]
    fn test_third_band() {
        assert_eq!(mileage_reimbursement(dec("600"), &legacy_bands()), dec("243.00"));
        assert_eq!(mileage_reimbursement(dec("1080"), &legacy_bands()), dec("363.00"));
    }

    /// Fractional miles are reimbursed exactly.
    #[test]
    fn test_fractional_miles() {
        assert_eq!(
            mileage_reimbursement(dec("100.5"), &legacy_bands()),
            dec("58.200")
        );
    }

    /// The function is continuous across band boundaries.
    #[test]
    fn test_continuous_at_boundaries() {
        let bands = legacy_bands();
        let below = mileage_reimbursement(dec("499.99"), &bands);
        let at = mileage_reimbursement(dec("500"), &bands);
        let above = mileage_reimbursement(dec("500.01"), &bands);

        assert!(below < at && at < above);
        assert_eq!(at - below, dec("0.0040"));
        assert_eq!(above - at, dec("0.0025"));
    }

    /// A single unbounded band is a flat rate.
    #[test]
    fn test_single_flat_band() {
        let bands = vec![MileageRateBand {
            up_to: None,
            rate: dec("0.655"),
        }];
        assert_eq!(mileage_reimbursement(dec("1000"), &bands), dec("655.000"));
    }

    #[test]
    fn test_calculate_mileage_audit_step() {
        let result = calculate_mileage(dec("600"), &legacy_bands(), 2);

        assert_eq!(result.amount, dec("243.00"));
        assert_eq!(result.audit_step.step_number, 2);
        assert_eq!(result.audit_step.rule_id, "mileage_reimbursement");
        assert_eq!(result.audit_step.output["mileage"], "243");
        assert_eq!(
            result.audit_step.reasoning,
            "100 mi x $0.58 + 400 mi x $0.4 + 100 mi x $0.25 = $243"
        );
    }

    #[test]
    fn test_calculate_mileage_zero_reasoning() {
        let result = calculate_mileage(Decimal::ZERO, &legacy_bands(), 2);
        assert_eq!(result.audit_step.reasoning, "No miles traveled");
    }
}
