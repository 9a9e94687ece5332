use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};

/// interest and fine rates in force for a loan
///
/// A loan may carry a frozen copy of this so later changes to profile defaults never
/// reach back into historical debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// percent charged per billing cycle
    pub interest_rate: Rate,
    /// one-off fine on overdue balances, percent
    pub fine_percent: Rate,
    /// late interest per overdue day, percent
    pub daily_interest_percent: Rate,
}

impl Policy {
    pub fn new(interest_rate: Rate, fine_percent: Rate, daily_interest_percent: Rate) -> Self {
        Self {
            interest_rate,
            fine_percent,
            daily_interest_percent,
        }
    }

    /// policy that charges nothing
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        for (name, rate) in [
            ("interestRate", self.interest_rate),
            ("finePercent", self.fine_percent),
            ("dailyInterestPercent", self.daily_interest_percent),
        ] {
            if rate.is_negative() {
                return Err(LedgerError::InvalidConfiguration {
                    message: format!("{} must not be negative, got {}", name, rate),
                });
            }
        }
        Ok(())
    }
}

/// engine-wide knobs that are not part of any single loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// slack when deciding whether a full month of interest was paid on monthly renewal
    pub renewal_tolerance: Money,
    /// residual below which collaborators treat an installment as settled
    pub settlement_threshold: Money,
    /// length of one billing cycle in days
    pub days_per_cycle: u32,
    /// count only weekdays when generating daily schedules
    pub skip_weekends: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            renewal_tolerance: Money::ONE,
            settlement_threshold: Money::from_decimal(dec!(0.10)),
            days_per_cycle: 30,
            skip_weekends: false,
        }
    }
}

impl EngineConfig {
    /// parse from json, missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| LedgerError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.days_per_cycle == 0 {
            return Err(LedgerError::InvalidConfiguration {
                message: "daysPerCycle must be positive".to_string(),
            });
        }
        if self.renewal_tolerance.is_negative() {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("renewalTolerance must not be negative, got {}", self.renewal_tolerance),
            });
        }
        if self.settlement_threshold.is_negative() {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "settlementThreshold must not be negative, got {}",
                    self.settlement_threshold
                ),
            });
        }
        Ok(())
    }

    /// residual small enough to count as paid
    pub fn is_effectively_zero(&self, residual: Money) -> bool {
        residual < self.settlement_threshold
    }
}
