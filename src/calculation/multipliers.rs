//! Contextual multipliers for multi-day trips.
//!
//! Three stages run in a fixed order over the base amount: efficiency,
//! trip length, then daily spending. Each stage is the product of the
//! factors its tables select. Tables are keyed on one metric and resolved
//! first-match-wins; the duration tier picks which tables apply.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::rule_table::{Bound, RuleRow, dec, lookup, row};
use super::tiers::{DurationTier, EfficiencyTier, TierContext};
use crate::models::{AuditStep, TripInput};

/// The value a table is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Trip length in days.
    Days,
    /// Total miles.
    Miles,
    /// Receipts per day.
    ReceiptsPerDay,
}

/// A named lookup table over one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleTable {
    /// Identifier used in audit output.
    pub name: &'static str,
    /// The metric the rows test.
    pub metric: Metric,
    /// Rows, first match wins.
    pub rows: &'static [RuleRow],
}

impl RuleTable {
    fn evaluate(&self, trip: &TripInput, tiers: &TierContext) -> AppliedFactor {
        let value = match self.metric {
            Metric::Days => trip.days(),
            Metric::Miles => trip.miles_traveled,
            Metric::ReceiptsPerDay => tiers.receipts_per_day,
        };
        match lookup(self.rows, value) {
            Some(row) => AppliedFactor {
                rule: self.name,
                label: row.label,
                factor: row.value,
            },
            None => AppliedFactor::neutral(self.name),
        }
    }
}

/// One factor that contributed to a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppliedFactor {
    /// The table or rule that produced the factor.
    pub rule: &'static str,
    /// The row that matched.
    pub label: &'static str,
    /// The factor.
    pub factor: Decimal,
}

impl AppliedFactor {
    fn neutral(rule: &'static str) -> Self {
        Self {
            rule,
            label: "neutral",
            factor: Decimal::ONE,
        }
    }
}

// ==========================================================================
// Length tables
// ==========================================================================

static TRIP_LENGTH: RuleTable = RuleTable {
    name: "trip_length",
    metric: Metric::Days,
    rows: &[
        row(Bound::Between(dec(5, 0), dec(5, 0)), dec(110, 2), "five-day trip"),
        row(Bound::Between(dec(4, 0), dec(4, 0)), dec(105, 2), "four-day trip"),
        row(Bound::Between(dec(6, 0), dec(6, 0)), dec(105, 2), "six-day trip"),
        row(Bound::Below(dec(3, 0)), dec(95, 2), "short trip"),
        row(Bound::Above(dec(7, 0)), dec(95, 2), "long trip"),
        row(Bound::Any, dec(1, 0), "standard length"),
    ],
};

static EXTENDED_LENGTH: RuleTable = RuleTable {
    name: "extended_trip_length",
    metric: Metric::ReceiptsPerDay,
    rows: &[
        row(Bound::Above(dec(140, 0)), dec(130, 2), "high daily spending"),
        row(Bound::Above(dec(100, 0)), dec(115, 2), "moderate daily spending"),
        row(Bound::Any, dec(1, 0), "low daily spending"),
    ],
};

static TWELVE_TO_THIRTEEN_DAY_LENGTH: RuleTable = RuleTable {
    name: "twelve_to_thirteen_day_length",
    metric: Metric::ReceiptsPerDay,
    rows: &[row(Bound::Any, dec(115, 2), "twelve to thirteen days")],
};

static ELEVEN_DAY_LENGTH: RuleTable = RuleTable {
    name: "eleven_day_length",
    metric: Metric::ReceiptsPerDay,
    rows: &[
        row(Bound::AtLeast(dec(200, 0)), dec(115, 2), "high daily spending"),
        row(Bound::AtLeast(dec(100, 0)), dec(120, 2), "moderate daily spending"),
        row(Bound::Any, dec(105, 2), "low daily spending"),
    ],
};

static TEN_DAY_LENGTH: RuleTable = RuleTable {
    name: "ten_day_length",
    metric: Metric::ReceiptsPerDay,
    rows: &[
        row(Bound::Above(dec(300, 0)), dec(95, 2), "excessive daily spending"),
        row(Bound::AtLeast(dec(100, 0)), dec(125, 2), "moderate daily spending"),
        row(Bound::Any, dec(110, 2), "low daily spending"),
    ],
};

static EIGHT_TO_NINE_DAY_LENGTH: RuleTable = RuleTable {
    name: "eight_to_nine_day_length",
    metric: Metric::Miles,
    rows: &[
        row(Bound::Above(dec(1000, 0)), dec(85, 2), "very high mileage"),
        row(Bound::Above(dec(800, 0)), dec(1, 0), "high mileage"),
        row(Bound::Any, dec(115, 2), "moderate mileage"),
    ],
};

// ==========================================================================
// Spending tables
// ==========================================================================

static GENERAL_SPENDING: RuleTable = RuleTable {
    name: "general_spending",
    metric: Metric::ReceiptsPerDay,
    rows: &[
        row(Bound::Above(dec(150, 0)), dec(90, 2), "high daily spending"),
        row(Bound::Below(dec(30, 0)), dec(95, 2), "very low daily spending"),
        row(Bound::Any, dec(1, 0), "typical daily spending"),
    ],
};

static TWO_DAY_SPENDING: RuleTable = RuleTable {
    name: "two_day_spending",
    metric: Metric::ReceiptsPerDay,
    rows: &[
        row(Bound::Above(dec(400, 0)), dec(110, 2), "over $400/day"),
        row(Bound::Above(dec(300, 0)), dec(90, 2), "over $300/day"),
        row(Bound::Any, dec(1, 0), "neutral"),
    ],
};

static THREE_DAY_SPENDING: RuleTable = RuleTable {
    name: "three_day_spending",
    metric: Metric::ReceiptsPerDay,
    rows: &[
        row(Bound::Above(dec(400, 0)), dec(115, 2), "over $400/day"),
        row(Bound::Above(dec(300, 0)), dec(105, 2), "over $300/day"),
        row(Bound::Any, dec(1, 0), "neutral"),
    ],
};

static FOUR_DAY_SPENDING: RuleTable = RuleTable {
    name: "four_day_spending",
    metric: Metric::ReceiptsPerDay,
    rows: &[
        row(Bound::Above(dec(500, 0)), dec(1, 0), "over $500/day"),
        row(Bound::Above(dec(450, 0)), dec(105, 2), "over $450/day"),
        row(Bound::Above(dec(350, 0)), dec(90, 2), "over $350/day"),
        row(Bound::Any, dec(1, 0), "neutral"),
    ],
};

static FIVE_DAY_SPENDING: RuleTable = RuleTable {
    name: "five_day_spending",
    metric: Metric::ReceiptsPerDay,
    rows: &[
        row(Bound::Above(dec(500, 0)), dec(1, 0), "over $500/day"),
        row(Bound::Above(dec(450, 0)), dec(105, 2), "over $450/day"),
        row(Bound::Above(dec(400, 0)), dec(90, 2), "over $400/day"),
        row(Bound::Above(dec(350, 0)), dec(95, 2), "over $350/day"),
        row(Bound::Any, dec(110, 2), "up to $350/day"),
    ],
};

static SIX_DAY_SPENDING: RuleTable = RuleTable {
    name: "six_day_spending",
    metric: Metric::ReceiptsPerDay,
    rows: &[
        row(Bound::Below(dec(50, 0)), dec(70, 2), "under $50/day"),
        row(Bound::Above(dec(500, 0)), dec(75, 2), "over $500/day"),
        row(Bound::Above(dec(400, 0)), dec(90, 2), "over $400/day"),
        row(Bound::AtLeast(dec(150, 0)), dec(110, 2), "$150 to $400/day"),
        row(Bound::Any, dec(1, 0), "neutral"),
    ],
};

static SEVEN_DAY_SPENDING: RuleTable = RuleTable {
    name: "seven_day_spending",
    metric: Metric::ReceiptsPerDay,
    rows: &[row(Bound::Any, dec(1, 0), "neutral")],
};

static NINE_DAY_SPENDING: RuleTable = RuleTable {
    name: "nine_day_spending",
    metric: Metric::ReceiptsPerDay,
    rows: &[
        row(
            Bound::Between(dec(100, 0), dec(200, 0)),
            dec(125, 2),
            "$100 to $200/day",
        ),
        row(Bound::Any, dec(1, 0), "neutral"),
    ],
};

static LONG_TRIP_SPENDING: RuleTable = RuleTable {
    name: "long_trip_spending",
    metric: Metric::ReceiptsPerDay,
    rows: &[
        row(Bound::Below(dec(25, 0)), dec(65, 2), "under $25/day"),
        row(Bound::Below(dec(50, 0)), dec(75, 2), "under $50/day"),
        row(Bound::Any, dec(1, 0), "neutral"),
    ],
};

static TEN_PLUS_DAY_SPENDING: RuleTable = RuleTable {
    name: "long_trip_spending",
    metric: Metric::ReceiptsPerDay,
    rows: &[
        row(Bound::Below(dec(25, 0)), dec(65, 2), "under $25/day"),
        row(Bound::Below(dec(50, 0)), dec(75, 2), "under $50/day"),
        row(Bound::Below(dec(75, 0)), dec(90, 2), "under $75/day"),
        row(Bound::Any, dec(1, 0), "neutral"),
    ],
};

/// Efficiency factor for a miles-per-day tier.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::{efficiency_multiplier, EfficiencyTier};
/// use rust_decimal::Decimal;
///
/// assert_eq!(efficiency_multiplier(EfficiencyTier::Optimal), Decimal::new(110, 2));
/// assert_eq!(efficiency_multiplier(EfficiencyTier::Excessive), Decimal::new(95, 2));
/// assert_eq!(efficiency_multiplier(EfficiencyTier::High), Decimal::ONE);
/// ```
pub fn efficiency_multiplier(tier: EfficiencyTier) -> Decimal {
    match tier {
        EfficiencyTier::Optimal => dec(110, 2),
        EfficiencyTier::NearOptimal => dec(102, 2),
        EfficiencyTier::Low | EfficiencyTier::Excessive => dec(95, 2),
        EfficiencyTier::Moderate | EfficiencyTier::High => Decimal::ONE,
    }
}

fn long_trip_length_table(tier: DurationTier, days: u32) -> Option<&'static RuleTable> {
    match (tier, days) {
        (DurationTier::Extended, _) => Some(&EXTENDED_LENGTH),
        (DurationTier::VeryLong, 12..=13) => Some(&TWELVE_TO_THIRTEEN_DAY_LENGTH),
        (DurationTier::VeryLong, 11) => Some(&ELEVEN_DAY_LENGTH),
        (DurationTier::VeryLong, 10) => Some(&TEN_DAY_LENGTH),
        (DurationTier::VeryLong, 8..=9) => Some(&EIGHT_TO_NINE_DAY_LENGTH),
        _ => None,
    }
}

fn duration_spending_table(tier: DurationTier, days: u32) -> Option<&'static RuleTable> {
    match (tier, days) {
        (DurationTier::Short, 2) => Some(&TWO_DAY_SPENDING),
        (DurationTier::Short, 3) => Some(&THREE_DAY_SPENDING),
        (DurationTier::Enhanced, 4) => Some(&FOUR_DAY_SPENDING),
        (DurationTier::Enhanced, 5) => Some(&FIVE_DAY_SPENDING),
        (DurationTier::Moderate, _) => Some(&SIX_DAY_SPENDING),
        (DurationTier::LongTiered, _) => Some(&SEVEN_DAY_SPENDING),
        (DurationTier::VeryLong, 9) => Some(&NINE_DAY_SPENDING),
        _ => None,
    }
}

fn long_trip_spending_table(tier: DurationTier, days: u32) -> Option<&'static RuleTable> {
    match tier {
        DurationTier::VeryLong | DurationTier::Extended if days >= 10 => {
            Some(&TEN_PLUS_DAY_SPENDING)
        }
        DurationTier::VeryLong => Some(&LONG_TRIP_SPENDING),
        _ => None,
    }
}

/// Business-travel combo for six to eight day trips.
fn business_combo(trip: &TripInput, tiers: &TierContext) -> Option<AppliedFactor> {
    if !(6..=8).contains(&trip.duration_days) {
        return None;
    }
    let miles = trip.miles_traveled;
    let (label, factor) = if miles > dec(800, 0) && tiers.receipts_per_day < dec(200, 0) {
        if miles > dec(1000, 0) {
            ("long-haul business trip", dec(135, 2))
        } else {
            ("business trip", dec(125, 2))
        }
    } else if miles > dec(600, 0) {
        ("regional business trip", dec(115, 2))
    } else {
        ("no business pattern", Decimal::ONE)
    };
    Some(AppliedFactor {
        rule: "business_combo",
        label,
        factor,
    })
}

/// High-mileage business patch for eight to eleven day trips.
fn high_mileage_business(trip: &TripInput, tiers: &TierContext) -> Option<AppliedFactor> {
    if !(8..=11).contains(&trip.duration_days) {
        return None;
    }
    let applies = trip.miles_traveled > dec(800, 0) && tiers.receipts_per_day >= dec(50, 0);
    Some(AppliedFactor {
        rule: "high_mileage_business",
        label: if applies {
            "over 800 miles with receipts"
        } else {
            "not applicable"
        },
        factor: if applies { dec(105, 2) } else { Decimal::ONE },
    })
}

/// Factors making up the length stage, in evaluation order.
pub fn length_factors(trip: &TripInput, tiers: &TierContext) -> Vec<AppliedFactor> {
    let mut factors = vec![TRIP_LENGTH.evaluate(trip, tiers)];
    factors.extend(business_combo(trip, tiers));
    if let Some(table) = long_trip_length_table(tiers.duration, trip.duration_days) {
        factors.push(table.evaluate(trip, tiers));
    }
    factors
}

/// Factors making up the daily-spending stage, in evaluation order.
pub fn spending_factors(trip: &TripInput, tiers: &TierContext) -> Vec<AppliedFactor> {
    let mut factors = vec![GENERAL_SPENDING.evaluate(trip, tiers)];
    if let Some(table) = duration_spending_table(tiers.duration, trip.duration_days) {
        factors.push(table.evaluate(trip, tiers));
    }
    if let Some(table) = long_trip_spending_table(tiers.duration, trip.duration_days) {
        factors.push(table.evaluate(trip, tiers));
    }
    factors.extend(high_mileage_business(trip, tiers));
    factors
}

fn product(factors: &[AppliedFactor]) -> Decimal {
    factors.iter().fold(Decimal::ONE, |acc, f| acc * f.factor)
}

/// The result of the multiplier stages.
#[derive(Debug, Clone)]
pub struct MultiplierResult {
    /// Amount after all three stages.
    pub amount: Decimal,
    /// Efficiency stage factor.
    pub efficiency: Decimal,
    /// Length stage factor.
    pub length: Decimal,
    /// Daily-spending stage factor.
    pub spending: Decimal,
    /// `efficiency × length × spending`.
    pub multiplier: Decimal,
    /// One audit step per stage.
    pub audit_steps: Vec<AuditStep>,
}

fn stage_step(
    step_number: u32,
    rule_id: &str,
    rule_name: &str,
    amount_in: Decimal,
    factors: &[AppliedFactor],
    factor: Decimal,
    amount_out: Decimal,
) -> AuditStep {
    let terms: Vec<String> = factors
        .iter()
        .filter(|f| f.factor != Decimal::ONE)
        .map(|f| format!("{} ({})", f.factor.normalize(), f.label))
        .collect();
    let reasoning = if terms.is_empty() {
        format!("No adjustment; amount stays ${}", amount_in.normalize())
    } else {
        format!(
            "${} x {} = ${}",
            amount_in.normalize(),
            terms.join(" x "),
            amount_out.normalize()
        )
    };

    AuditStep {
        step_number,
        rule_id: rule_id.to_string(),
        rule_name: rule_name.to_string(),
        input: serde_json::json!({
            "amount": amount_in.normalize().to_string()
        }),
        output: serde_json::json!({
            "factors": factors
                .iter()
                .map(|f| serde_json::json!({
                    "rule": f.rule,
                    "label": f.label,
                    "factor": f.factor.normalize().to_string()
                }))
                .collect::<Vec<_>>(),
            "factor": factor.normalize().to_string(),
            "amount": amount_out.normalize().to_string()
        }),
        reasoning,
    }
}

/// Applies the efficiency, length and spending stages to a base amount.
///
/// # Examples
///
/// ```
/// use reimbursement_engine::calculation::{apply_multipliers, TierContext};
/// use reimbursement_engine::models::TripInput;
/// use rust_decimal::Decimal;
///
/// let trip = TripInput::new(5, Decimal::new(200, 0), Decimal::new(700, 0)).unwrap();
/// let tiers = TierContext::classify(&trip);
///
/// let result = apply_multipliers(Decimal::new(693, 0), &trip, &tiers, 5);
/// assert_eq!(result.efficiency, Decimal::ONE);
/// assert_eq!(result.length, Decimal::new(110, 2));
/// ```
pub fn apply_multipliers(
    base_amount: Decimal,
    trip: &TripInput,
    tiers: &TierContext,
    step_number_start: u32,
) -> MultiplierResult {
    let efficiency = efficiency_multiplier(tiers.efficiency);
    let efficiency_factors = [AppliedFactor {
        rule: "efficiency",
        label: efficiency_label(tiers.efficiency),
        factor: efficiency,
    }];
    let after_efficiency = base_amount * efficiency;

    let length_applied = length_factors(trip, tiers);
    let length = product(&length_applied);
    let after_length = after_efficiency * length;

    let spending_applied = spending_factors(trip, tiers);
    let spending = product(&spending_applied);
    let amount = after_length * spending;

    debug!(
        base = %base_amount,
        efficiency = %efficiency,
        length = %length,
        spending = %spending,
        amount = %amount,
        "Multipliers applied"
    );

    let audit_steps = vec![
        stage_step(
            step_number_start,
            "efficiency_multiplier",
            "Efficiency Multiplier",
            base_amount,
            &efficiency_factors,
            efficiency,
            after_efficiency,
        ),
        stage_step(
            step_number_start + 1,
            "length_multiplier",
            "Trip Length Multiplier",
            after_efficiency,
            &length_applied,
            length,
            after_length,
        ),
        stage_step(
            step_number_start + 2,
            "spending_multiplier",
            "Daily Spending Multiplier",
            after_length,
            &spending_applied,
            spending,
            amount,
        ),
    ];

    MultiplierResult {
        amount,
        efficiency,
        length,
        spending,
        multiplier: efficiency * length * spending,
        audit_steps,
    }
}

fn efficiency_label(tier: EfficiencyTier) -> &'static str {
    match tier {
        EfficiencyTier::Low => "under 100 miles/day",
        EfficiencyTier::Moderate => "100 to 120 miles/day",
        EfficiencyTier::NearOptimal => "120 to 180 miles/day",
        EfficiencyTier::Optimal => "180 to 220 miles/day",
        EfficiencyTier::High => "220 to 300 miles/day",
        EfficiencyTier::Excessive => "over 300 miles/day",
    }
}
