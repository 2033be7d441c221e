//! Calculation logic for the Reimbursement Engine.
//!
//! Each stage of the pipeline lives in its own module and returns its value
//! together with the audit step(s) describing it. [`calculate_reimbursement`]
//! runs the stages in order: tier classification, then either the single-day
//! path or base amount, multipliers, bonuses and fraud screening, and finally
//! the payout floor and currency rounding.

mod base_amount;
mod bonuses;
mod engine;
mod floor;
mod fraud;
mod mileage;
mod multipliers;
mod receipts;
mod rule_table;
mod single_day;
mod tiers;

pub use base_amount::{BaseAmountResult, calculate_base_amount};
pub use bonuses::{BonusResult, apply_bonuses, mileage_bonus, receipt_cents, receipt_cents_bonus};
pub use engine::{calculate_reimbursement, max_supported_input, reimburse};
pub use floor::{FloorResult, RoundingResult, apply_floor, round_currency, round_final_amount};
pub use fraud::{
    FraudAction, FraudPattern, FraudScreenResult, KNOWN_FRAUD_PATTERN, KNOWN_FRAUD_PATTERNS,
    apply_fraud_penalties, find_mileage_override, matching_patterns,
};
pub use mileage::{MileageResult, calculate_mileage, mileage_reimbursement};
pub use multipliers::{
    AppliedFactor, Metric, MultiplierResult, RuleTable, apply_multipliers, efficiency_multiplier,
    length_factors, spending_factors,
};
pub use receipts::{
    ReceiptResult, calculate_receipt_reimbursement, receipt_rate, receipt_reimbursement,
};
pub use rule_table::{Bound, RuleRow, lookup};
pub use single_day::{
    SINGLE_DAY_ALLOWANCE, SingleDayResult, calculate_single_day, single_day_allowance,
};
pub use tiers::{
    DurationTier, EfficiencyTier, MileageTier, ReceiptBand, SpendingTier, TierClassificationResult,
    TierContext, classify_trip,
};
