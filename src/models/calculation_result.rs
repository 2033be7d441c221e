//! Calculation result models for the Reimbursement Engine.
//!
//! This module contains the [`ReimbursementResult`] type and its associated
//! structures that capture the outputs of a reimbursement calculation,
//! including the component breakdown and the audit trace.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TripInput;
use crate::calculation::TierContext;

/// Which top-level algorithm produced the amount.
///
/// Single-day trips use a separate calculation rather than a
/// parameterization of the multi-day pipeline.
///
/// # Example
///
/// ```
/// use reimbursement_engine::models::CalculationPath;
///
/// assert_eq!(CalculationPath::for_duration(1), CalculationPath::SingleDay);
/// assert_eq!(CalculationPath::for_duration(2), CalculationPath::MultiDay);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationPath {
    /// Mileage plus a flat day allowance, capped.
    SingleDay,
    /// Base amount, multipliers, bonuses and fraud penalties.
    MultiDay,
}

impl CalculationPath {
    /// Selects the path for a trip length.
    pub fn for_duration(duration_days: u32) -> Self {
        if duration_days == 1 {
            CalculationPath::SingleDay
        } else {
            CalculationPath::MultiDay
        }
    }
}

/// The intermediate amounts of a calculation.
///
/// Fields that do not apply to the chosen path hold their neutral value
/// (zero for amounts, one for factors).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementBreakdown {
    /// Tiered mileage reimbursement.
    pub mileage: Decimal,
    /// Flat per-diem candidate (`days × per diem rate`).
    pub per_diem: Decimal,
    /// Receipt-based candidate.
    pub receipt_based: Decimal,
    /// The greater of the per-diem and receipt candidates, or the single-day allowance.
    pub lodging: Decimal,
    /// `mileage + lodging`.
    pub base_amount: Decimal,
    /// Combined multiplier applied to the base amount.
    pub multiplier: Decimal,
    /// Total of flat additive bonuses.
    pub bonuses: Decimal,
    /// Combined fraud-penalty factor (1 when no pattern matched).
    pub penalty_factor: Decimal,
    /// The minimum payable amount for the trip.
    pub floor: Decimal,
    /// The amount before rounding to currency precision.
    pub unrounded_amount: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag trips that matched a known anomalous pattern. They never
/// change the amount by themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
///
/// # Example
///
/// ```
/// use reimbursement_engine::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
/// };
/// assert!(trace.rule_ids().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// Returns the rule ids in the order they fired.
    pub fn rule_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.rule_id.as_str()).collect()
    }

    /// Returns the step recorded for a rule, if it fired.
    pub fn step(&self, rule_id: &str) -> Option<&AuditStep> {
        self.steps.iter().find(|s| s.rule_id == rule_id)
    }
}

/// The complete result of a reimbursement calculation.
///
/// The result is fully determined by the trip and the policy: it carries no
/// identifiers or timestamps, so repeated calls compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementResult {
    /// The trip that was evaluated.
    pub input: TripInput,
    /// The algorithm that produced the amount.
    pub path: CalculationPath,
    /// The categorical classification of the trip.
    pub tiers: TierContext,
    /// Intermediate amounts.
    pub breakdown: ReimbursementBreakdown,
    /// The payable amount, rounded to two decimal places.
    pub amount: Decimal,
    /// Audit trace of every rule that fired.
    pub audit_trace: AuditTrace,
}
