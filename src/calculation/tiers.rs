//! Trip classification.
//!
//! Every downstream rule branches on one of the categorical tiers computed
//! here. Tiers within a dimension are mutually exclusive and resolve
//! boundary values to the tier whose lower bound is inclusive.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AuditStep, TripInput};

/// Trip-length bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationTier {
    /// Exactly one day.
    SingleDay,
    /// Two or three days.
    Short,
    /// Four or five days.
    Enhanced,
    /// Six days.
    Moderate,
    /// Seven days.
    LongTiered,
    /// Eight to thirteen days.
    VeryLong,
    /// Fourteen days or more.
    Extended,
}

impl DurationTier {
    /// Buckets a trip length.
    ///
    /// # Examples
    ///
    /// ```
    /// use reimbursement_engine::calculation::DurationTier;
    ///
    /// assert_eq!(DurationTier::from_days(1), DurationTier::SingleDay);
    /// assert_eq!(DurationTier::from_days(5), DurationTier::Enhanced);
    /// assert_eq!(DurationTier::from_days(13), DurationTier::VeryLong);
    /// assert_eq!(DurationTier::from_days(14), DurationTier::Extended);
    /// ```
    pub fn from_days(days: u32) -> Self {
        match days {
            0 | 1 => DurationTier::SingleDay,
            2..=3 => DurationTier::Short,
            4..=5 => DurationTier::Enhanced,
            6 => DurationTier::Moderate,
            7 => DurationTier::LongTiered,
            8..=13 => DurationTier::VeryLong,
            _ => DurationTier::Extended,
        }
    }
}

/// Total-mileage bucket, aligned with the mileage rate bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MileageTier {
    /// Under 100 miles.
    Local,
    /// 100 to under 500 miles.
    Regional,
    /// 500 miles or more.
    LongHaul,
}

impl MileageTier {
    /// Buckets total miles.
    pub fn from_miles(miles: Decimal) -> Self {
        if miles < Decimal::ONE_HUNDRED {
            MileageTier::Local
        } else if miles < Decimal::new(500, 0) {
            MileageTier::Regional
        } else {
            MileageTier::LongHaul
        }
    }
}

/// Miles-per-day bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencyTier {
    /// Under 100 miles per day.
    Low,
    /// 100 to under 120.
    Moderate,
    /// 120 to under 180.
    NearOptimal,
    /// 180 to 220, both inclusive.
    Optimal,
    /// Over 220 up to 300.
    High,
    /// Over 300.
    Excessive,
}

impl EfficiencyTier {
    /// Buckets a miles-per-day ratio.
    ///
    /// # Examples
    ///
    /// ```
    /// use reimbursement_engine::calculation::EfficiencyTier;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(EfficiencyTier::from_miles_per_day(Decimal::new(180, 0)), EfficiencyTier::Optimal);
    /// assert_eq!(EfficiencyTier::from_miles_per_day(Decimal::new(220, 0)), EfficiencyTier::Optimal);
    /// assert_eq!(EfficiencyTier::from_miles_per_day(Decimal::new(221, 0)), EfficiencyTier::High);
    /// ```
    pub fn from_miles_per_day(miles_per_day: Decimal) -> Self {
        if miles_per_day < Decimal::ONE_HUNDRED {
            EfficiencyTier::Low
        } else if miles_per_day < Decimal::new(120, 0) {
            EfficiencyTier::Moderate
        } else if miles_per_day < Decimal::new(180, 0) {
            EfficiencyTier::NearOptimal
        } else if miles_per_day <= Decimal::new(220, 0) {
            EfficiencyTier::Optimal
        } else if miles_per_day <= Decimal::new(300, 0) {
            EfficiencyTier::High
        } else {
            EfficiencyTier::Excessive
        }
    }
}

/// Receipts-per-day bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendingTier {
    /// Under $50 per day.
    PenaltyLow,
    /// $50 to $150 per day.
    Standard,
    /// Over $150 up to $500 per day.
    High,
    /// Over $500 per day.
    Extreme,
}

impl SpendingTier {
    /// Buckets a receipts-per-day ratio.
    pub fn from_receipts_per_day(receipts_per_day: Decimal) -> Self {
        if receipts_per_day < Decimal::new(50, 0) {
            SpendingTier::PenaltyLow
        } else if receipts_per_day <= Decimal::new(150, 0) {
            SpendingTier::Standard
        } else if receipts_per_day <= Decimal::new(500, 0) {
            SpendingTier::High
        } else {
            SpendingTier::Extreme
        }
    }
}

/// Band of the receipt-based reimbursement schedule.
///
/// A penalty-low daily spend takes precedence over the total-based bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptBand {
    /// Under $50 per day.
    PenaltyLow,
    /// Under $600 total.
    Standard,
    /// $600 to under $800 total.
    SweetSpot,
    /// $800 to under $1200 total.
    Diminishing,
    /// $1200 to under $2000 total.
    Tapered,
    /// $2000 total or more.
    Residual,
}

impl ReceiptBand {
    /// Selects the band for a receipt total and its daily average.
    ///
    /// # Examples
    ///
    /// ```
    /// use reimbursement_engine::calculation::ReceiptBand;
    /// use rust_decimal::Decimal;
    ///
    /// let band = ReceiptBand::from_receipts(Decimal::new(600, 0), Decimal::new(120, 0));
    /// assert_eq!(band, ReceiptBand::SweetSpot);
    /// ```
    pub fn from_receipts(receipts: Decimal, receipts_per_day: Decimal) -> Self {
        if receipts_per_day < Decimal::new(50, 0) {
            ReceiptBand::PenaltyLow
        } else if receipts < Decimal::new(600, 0) {
            ReceiptBand::Standard
        } else if receipts < Decimal::new(800, 0) {
            ReceiptBand::SweetSpot
        } else if receipts < Decimal::new(1200, 0) {
            ReceiptBand::Diminishing
        } else if receipts < Decimal::new(2000, 0) {
            ReceiptBand::Tapered
        } else {
            ReceiptBand::Residual
        }
    }
}

/// The categorical context of a trip, plus the ratios it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierContext {
    /// Trip-length bucket.
    pub duration: DurationTier,
    /// Total-mileage bucket.
    pub mileage: MileageTier,
    /// Miles-per-day bucket.
    pub efficiency: EfficiencyTier,
    /// Receipts-per-day bucket.
    pub spending: SpendingTier,
    /// Receipt-schedule band.
    pub receipt_band: ReceiptBand,
    /// `miles_traveled / duration_days`.
    pub miles_per_day: Decimal,
    /// `receipts_amount / duration_days`.
    pub receipts_per_day: Decimal,
}

impl TierContext {
    /// Classifies a validated trip along every dimension.
    ///
    /// # Examples
    ///
    /// ```
    /// use reimbursement_engine::calculation::{DurationTier, EfficiencyTier, ReceiptBand, TierContext};
    /// use reimbursement_engine::models::TripInput;
    /// use rust_decimal::Decimal;
    ///
    /// let trip = TripInput::new(5, Decimal::new(900, 0), Decimal::new(700, 0)).unwrap();
    /// let tiers = TierContext::classify(&trip);
    ///
    /// assert_eq!(tiers.duration, DurationTier::Enhanced);
    /// assert_eq!(tiers.efficiency, EfficiencyTier::Optimal);
    /// assert_eq!(tiers.receipt_band, ReceiptBand::SweetSpot);
    /// ```
    pub fn classify(trip: &TripInput) -> Self {
        let metrics = trip.metrics();
        Self {
            duration: DurationTier::from_days(trip.duration_days),
            mileage: MileageTier::from_miles(trip.miles_traveled),
            efficiency: EfficiencyTier::from_miles_per_day(metrics.miles_per_day),
            spending: SpendingTier::from_receipts_per_day(metrics.receipts_per_day),
            receipt_band: ReceiptBand::from_receipts(
                trip.receipts_amount,
                metrics.receipts_per_day,
            ),
            miles_per_day: metrics.miles_per_day,
            receipts_per_day: metrics.receipts_per_day,
        }
    }
}

/// The result of classifying a trip, including the audit step.
#[derive(Debug, Clone)]
pub struct TierClassificationResult {
    /// The classification.
    pub tiers: TierContext,
    /// The audit step recording this classification.
    pub audit_step: AuditStep,
}

/// Classifies a trip and records the decision.
pub fn classify_trip(trip: &TripInput, step_number: u32) -> TierClassificationResult {
    let tiers = TierContext::classify(trip);

    let audit_step = AuditStep {
        step_number,
        rule_id: "tier_classification".to_string(),
        rule_name: "Tier Classification".to_string(),
        input: serde_json::json!({
            "trip_duration_days": trip.duration_days,
            "miles_traveled": trip.miles_traveled.normalize().to_string(),
            "total_receipts_amount": trip.receipts_amount.normalize().to_string()
        }),
        output: serde_json::json!({
            "duration": tiers.duration,
            "mileage": tiers.mileage,
            "efficiency": tiers.efficiency,
            "spending": tiers.spending,
            "receipt_band": tiers.receipt_band,
            "miles_per_day": tiers.miles_per_day.normalize().to_string(),
            "receipts_per_day": tiers.receipts_per_day.normalize().to_string()
        }),
        reasoning: format!(
            "{} day(s), {} miles/day, ${} receipts/day",
            trip.duration_days,
            tiers.miles_per_day.round_dp(2).normalize(),
            tiers.receipts_per_day.round_dp(2).normalize()
        ),
    };

    TierClassificationResult { tiers, audit_step }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn trip(days: i64, miles: &str, receipts: &str) -> TripInput {
        TripInput::new(days, dec(miles), dec(receipts)).unwrap()
    }

    // ==========================================================================
    // Duration tiers
    // ==========================================================================

    #[test]
    fn test_duration_tier_boundaries() {
        let expected = [
            (1, DurationTier::SingleDay),
            (2, DurationTier::Short),
            (3, DurationTier::Short),
            (4, DurationTier::Enhanced),
            (5, DurationTier::Enhanced),
            (6, DurationTier::Moderate),
            (7, DurationTier::LongTiered),
            (8, DurationTier::VeryLong),
            (13, DurationTier::VeryLong),
            (14, DurationTier::Extended),
            (90, DurationTier::Extended),
        ];
        for (days, tier) in expected {
            assert_eq!(DurationTier::from_days(days), tier, "days = {}", days);
        }
    }

    // ==========================================================================
    // Efficiency tiers
    // ==========================================================================

    #[test]
    fn test_efficiency_lower_bounds_are_inclusive() {
        assert_eq!(
            EfficiencyTier::from_miles_per_day(dec("99.99")),
            EfficiencyTier::Low
        );
        assert_eq!(
            EfficiencyTier::from_miles_per_day(dec("100")),
            EfficiencyTier::Moderate
        );
        assert_eq!(
            EfficiencyTier::from_miles_per_day(dec("120")),
            EfficiencyTier::NearOptimal
        );
        assert_eq!(
            EfficiencyTier::from_miles_per_day(dec("180")),
            EfficiencyTier::Optimal
        );
    }

    #[test]
    fn test_efficiency_optimal_includes_220() {
        assert_eq!(
            EfficiencyTier::from_miles_per_day(dec("220")),
            EfficiencyTier::Optimal
        );
        assert_eq!(
            EfficiencyTier::from_miles_per_day(dec("220.01")),
            EfficiencyTier::High
        );
    }

    #[test]
    fn test_efficiency_excessive_is_strictly_above_300() {
        assert_eq!(
            EfficiencyTier::from_miles_per_day(dec("300")),
            EfficiencyTier::High
        );
        assert_eq!(
            EfficiencyTier::from_miles_per_day(dec("300.01")),
            EfficiencyTier::Excessive
        );
    }

    // ==========================================================================
    // Spending tiers and receipt bands
    // ==========================================================================

    #[test]
    fn test_spending_tiers() {
        assert_eq!(
            SpendingTier::from_receipts_per_day(dec("49.99")),
            SpendingTier::PenaltyLow
        );
        assert_eq!(
            SpendingTier::from_receipts_per_day(dec("50")),
            SpendingTier::Standard
        );
        assert_eq!(
            SpendingTier::from_receipts_per_day(dec("150")),
            SpendingTier::Standard
        );
        assert_eq!(
            SpendingTier::from_receipts_per_day(dec("500")),
            SpendingTier::High
        );
        assert_eq!(
            SpendingTier::from_receipts_per_day(dec("500.01")),
            SpendingTier::Extreme
        );
    }

    #[test]
    fn test_receipt_band_600_is_sweet_spot() {
        assert_eq!(
            ReceiptBand::from_receipts(dec("599.99"), dec("300")),
            ReceiptBand::Standard
        );
        assert_eq!(
            ReceiptBand::from_receipts(dec("600.00"), dec("300")),
            ReceiptBand::SweetSpot
        );
        assert_eq!(
            ReceiptBand::from_receipts(dec("800"), dec("400")),
            ReceiptBand::Diminishing
        );
        assert_eq!(
            ReceiptBand::from_receipts(dec("1200"), dec("400")),
            ReceiptBand::Tapered
        );
        assert_eq!(
            ReceiptBand::from_receipts(dec("2000"), dec("400")),
            ReceiptBand::Residual
        );
    }

    #[test]
    fn test_penalty_low_takes_precedence_over_total() {
        // 20 days at $45/day is $900 total
        assert_eq!(
            ReceiptBand::from_receipts(dec("900"), dec("45")),
            ReceiptBand::PenaltyLow
        );
    }

    // ==========================================================================
    // Full classification
    // ==========================================================================

    #[test]
    fn test_classify_derives_ratios() {
        let tiers = TierContext::classify(&trip(8, "795", "1645.99"));

        assert_eq!(tiers.duration, DurationTier::VeryLong);
        assert_eq!(tiers.mileage, MileageTier::LongHaul);
        assert_eq!(tiers.efficiency, EfficiencyTier::Low);
        assert_eq!(tiers.spending, SpendingTier::High);
        assert_eq!(tiers.receipt_band, ReceiptBand::Tapered);
        assert_eq!(tiers.miles_per_day, dec("99.375"));
        assert_eq!(tiers.receipts_per_day, dec("205.74875"));
    }

    #[test]
    fn test_classify_mileage_tier() {
        assert_eq!(
            TierContext::classify(&trip(3, "99", "10")).mileage,
            MileageTier::Local
        );
        assert_eq!(
            TierContext::classify(&trip(3, "100", "10")).mileage,
            MileageTier::Regional
        );
        assert_eq!(
            TierContext::classify(&trip(3, "500", "10")).mileage,
            MileageTier::LongHaul
        );
    }

    #[test]
    fn test_classify_trip_audit_step() {
        let result = classify_trip(&trip(3, "540", "600"), 1);

        assert_eq!(result.audit_step.step_number, 1);
        assert_eq!(result.audit_step.rule_id, "tier_classification");
        assert_eq!(result.audit_step.output["duration"], "short");
        assert_eq!(result.audit_step.output["efficiency"], "optimal");
        assert_eq!(result.audit_step.output["receipt_band"], "sweet_spot");
        assert_eq!(result.audit_step.output["miles_per_day"], "180");
    }

    #[test]
    fn test_tier_context_roundtrips_through_json() {
        let tiers = TierContext::classify(&trip(10, "1192", "23.47"));
        let json = serde_json::to_string(&tiers).unwrap();
        let parsed: TierContext = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tiers);
    }
}
