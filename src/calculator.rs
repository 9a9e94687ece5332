//! Debt calculator facade.
//!
//! The only place a loan's effective policy is resolved. Callers that need the amount owed on
//! an installment go through here so that a frozen policy snapshot always wins over the
//! loan's live fields.

use chrono::NaiveDate;

use crate::config::{EngineConfig, Policy};
use crate::errors::{LedgerError, Result};
use crate::loan::{Installment, Loan};
use crate::modality::{dispatch, CalculationResult, ModalityRegistry, ModalityResolution};

/// the loan's frozen snapshot if it has one, else its live rates
pub fn resolve_policy(loan: &Loan) -> Policy {
    loan.policies_snapshot.unwrap_or_else(|| {
        Policy::new(loan.interest_rate, loan.fine_percent, loan.daily_interest_percent)
    })
}

/// which modality governs a loan and how the tag was resolved
pub fn modality_for(loan: &Loan) -> ModalityResolution {
    ModalityRegistry::standard().resolve(&loan.billing_cycle)
}

#[derive(Debug, Clone, Default)]
pub struct DebtCalculator {
    config: EngineConfig,
}

impl DebtCalculator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// amount owed on `installment` as of `today`
    pub fn calculate_total_due(
        &self,
        loan: &Loan,
        installment: &Installment,
        today: NaiveDate,
    ) -> Result<CalculationResult> {
        validate_balances(installment)?;
        let policy = resolve_policy(loan);
        policy.validate()?;

        Ok(dispatch::calculate(&loan.billing_cycle, installment, &policy, today, &self.config))
    }

    /// copy of the loan with each installment's point-in-time late fee filled in
    pub fn with_late_fees(&self, loan: &Loan, today: NaiveDate) -> Result<Loan> {
        let mut annotated = loan.clone();
        for installment in annotated.installments.iter_mut() {
            let debt = self.calculate_total_due(loan, installment, today)?;
            installment.late_fee_accrued = debt.late_fee;
        }
        Ok(annotated)
    }
}

/// amount owed on one installment with the default engine configuration
pub fn calculate_total_due(loan: &Loan, installment: &Installment, today: NaiveDate) -> Result<CalculationResult> {
    DebtCalculator::default().calculate_total_due(loan, installment, today)
}

fn validate_balances(installment: &Installment) -> Result<()> {
    for (name, value) in [
        ("principalRemaining", installment.principal_remaining()),
        ("interestRemaining", installment.interest_remaining()),
    ] {
        if value.is_negative() {
            return Err(LedgerError::InvalidAmount {
                amount: format!("{} {} on installment {}", name, value, installment.id),
            });
        }
    }
    Ok(())
}
