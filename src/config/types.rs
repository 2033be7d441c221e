//! Configuration types for the reimbursement policy.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML files of a policy directory.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Metadata about the policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyMetadata {
    /// Short identifier for the policy (e.g., "legacy").
    pub code: String,
    /// The human-readable name of the policy.
    pub name: String,
    /// The version of the calibration.
    pub version: String,
    /// Free-form description of where the numbers come from.
    #[serde(default)]
    pub description: String,
}

/// One band of the tiered mileage schedule.
///
/// A band covers the miles between the previous band's `up_to` (or zero)
/// and its own `up_to`. The last band has no upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MileageRateBand {
    /// Upper bound of the band in total miles; `None` for the final band.
    #[serde(default)]
    pub up_to: Option<Decimal>,
    /// Reimbursement per mile within this band.
    pub rate: Decimal,
}

/// A flat bonus paid once miles exceed a threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MileageBonusTier {
    /// Miles strictly above which the bonus applies.
    pub above: Decimal,
    /// The flat bonus amount.
    pub amount: Decimal,
}

/// Flat high-mileage bonus tables, highest threshold first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MileageBonusConfig {
    /// Bonuses for trips of two days or more.
    pub multi_day: Vec<MileageBonusTier>,
    /// Bonuses for single-day trips.
    pub single_day: Vec<MileageBonusTier>,
}

/// Legacy receipt-cents rounding bonus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CentsBonusConfig {
    /// Flat amount added when the receipt cents match.
    pub amount: Decimal,
    /// Cent values (0-99) that trigger the bonus.
    pub cents: Vec<u32>,
}

/// Scalar rates and limits from `rates.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatesConfig {
    /// Flat per-diem amount per trip day.
    pub per_diem_rate: Decimal,
    /// Minimum payable amount per trip day.
    pub floor_rate: Decimal,
    /// Hard cap on single-day trip amounts.
    pub single_day_cap: Decimal,
    /// Tiered mileage schedule, ascending.
    pub mileage: Vec<MileageRateBand>,
    /// Flat high-mileage bonuses.
    pub mileage_bonus: MileageBonusConfig,
    /// Receipt-cents rounding bonus.
    pub receipt_cents_bonus: CentsBonusConfig,
}

/// The complete reimbursement policy loaded from a policy directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    /// Policy metadata.
    metadata: PolicyMetadata,
    /// Rates and limits.
    rates: RatesConfig,
}

impl PolicyConfig {
    /// Creates a new PolicyConfig from its component parts, validating the rates.
    pub fn new(metadata: PolicyMetadata, rates: RatesConfig) -> EngineResult<Self> {
        validate_rates(&rates)?;
        Ok(Self { metadata, rates })
    }

    /// The built-in legacy policy.
    ///
    /// Matches `config/legacy/` on disk, so callers without a policy
    /// directory get identical results.
    ///
    /// # Example
    ///
    /// ```
    /// use reimbursement_engine::config::PolicyConfig;
    /// use rust_decimal::Decimal;
    ///
    /// let policy = PolicyConfig::legacy();
    /// assert_eq!(policy.rates().per_diem_rate, Decimal::new(100, 0));
    /// assert_eq!(policy.rates().single_day_cap, Decimal::new(1500, 0));
    /// ```
    pub fn legacy() -> Self {
        let bonus = |above: i64, amount: i64| MileageBonusTier {
            above: Decimal::new(above, 0),
            amount: Decimal::new(amount, 0),
        };

        Self {
            metadata: PolicyMetadata {
                code: "legacy".to_string(),
                name: "Legacy Travel Reimbursement Policy".to_string(),
                version: "1.0.0".to_string(),
                description: "Rates reconstructed from historical reimbursements".to_string(),
            },
            rates: RatesConfig {
                per_diem_rate: Decimal::new(100, 0),
                floor_rate: Decimal::new(50, 0),
                single_day_cap: Decimal::new(1500, 0),
                mileage: vec![
                    MileageRateBand {
                        up_to: Some(Decimal::new(100, 0)),
                        rate: Decimal::new(58, 2),
                    },
                    MileageRateBand {
                        up_to: Some(Decimal::new(500, 0)),
                        rate: Decimal::new(40, 2),
                    },
                    MileageRateBand {
                        up_to: None,
                        rate: Decimal::new(25, 2),
                    },
                ],
                mileage_bonus: MileageBonusConfig {
                    multi_day: vec![
                        bonus(1000, 300),
                        bonus(800, 200),
                        bonus(600, 120),
                        bonus(400, 60),
                    ],
                    single_day: vec![bonus(800, 50), bonus(600, 30)],
                },
                receipt_cents_bonus: CentsBonusConfig {
                    amount: Decimal::new(10, 0),
                    cents: vec![49, 99],
                },
            },
        }
    }

    /// Returns the policy metadata.
    pub fn policy(&self) -> &PolicyMetadata {
        &self.metadata
    }

    /// Returns the rates and limits.
    pub fn rates(&self) -> &RatesConfig {
        &self.rates
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::legacy()
    }
}

/// Largest rate, cap or bonus amount a policy may configure.
///
/// Together with the engine's input limit this keeps every product of a
/// rate and a trip quantity inside `Decimal`'s range.
pub const MAX_POLICY_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

fn invalid(message: impl Into<String>) -> EngineError {
    EngineError::InvalidConfig {
        message: message.into(),
    }
}

fn validate_rates(rates: &RatesConfig) -> EngineResult<()> {
    for (name, value) in [
        ("per_diem_rate", rates.per_diem_rate),
        ("floor_rate", rates.floor_rate),
        ("single_day_cap", rates.single_day_cap),
        ("receipt_cents_bonus.amount", rates.receipt_cents_bonus.amount),
    ] {
        check_amount(name, value)?;
    }
    for (name, tiers) in [
        ("multi_day", &rates.mileage_bonus.multi_day),
        ("single_day", &rates.mileage_bonus.single_day),
    ] {
        for (index, tier) in tiers.iter().enumerate() {
            check_amount(&format!("mileage_bonus.{}[{}]", name, index), tier.amount)?;
        }
    }

    if rates.mileage.is_empty() {
        return Err(invalid("mileage schedule must have at least one band"));
    }
    let mut previous = Decimal::ZERO;
    for (index, band) in rates.mileage.iter().enumerate() {
        check_amount(&format!("mileage band {} rate", index), band.rate)?;
        let is_last = index + 1 == rates.mileage.len();
        match (band.up_to, is_last) {
            (None, true) => {}
            (None, false) => {
                return Err(invalid(format!(
                    "mileage band {} is unbounded but is not the last band",
                    index
                )));
            }
            (Some(_), true) => {
                return Err(invalid("the last mileage band must be unbounded"));
            }
            (Some(up_to), false) => {
                if up_to <= previous {
                    return Err(invalid("mileage bands must be strictly ascending"));
                }
                previous = up_to;
            }
        }
    }

    for (name, tiers) in [
        ("multi_day", &rates.mileage_bonus.multi_day),
        ("single_day", &rates.mileage_bonus.single_day),
    ] {
        if tiers.windows(2).any(|pair| pair[0].above <= pair[1].above) {
            return Err(invalid(format!(
                "mileage_bonus.{} must list thresholds from highest to lowest",
                name
            )));
        }
    }

    if let Some(cents) = rates.receipt_cents_bonus.cents.iter().find(|c| **c > 99) {
        return Err(invalid(format!(
            "receipt_cents_bonus.cents must be between 0 and 99, got {}",
            cents
        )));
    }

    Ok(())
}

fn check_amount(name: &str, value: Decimal) -> EngineResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid(format!("{} must not be negative", name)));
    }
    if value > MAX_POLICY_AMOUNT {
        return Err(invalid(format!(
            "{} must not exceed {}, got {}",
            name, MAX_POLICY_AMOUNT, value
        )));
    }
    Ok(())
}
