use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::config::{EngineConfig, Policy};
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::loan::{Installment, Loan};
use crate::modality::{Modality, ModalityRegistry};

/// what a new loan is written with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
    pub principal: Money,
    pub policy: Policy,
    pub start_date: NaiveDate,
    /// monthly installments; single-installment modalities ignore it
    pub installment_count: u32,
    /// length of the term for daily modalities
    pub term_days: u32,
    pub skip_weekends: bool,
}

impl LoanTerms {
    pub fn new(principal: Money, policy: Policy, start_date: NaiveDate) -> Self {
        Self {
            principal,
            policy,
            start_date,
            installment_count: 1,
            term_days: 30,
            skip_weekends: false,
        }
    }

    /// cycle length and weekend handling taken from the engine configuration
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.term_days = config.days_per_cycle;
        self.skip_weekends = config.skip_weekends;
        self
    }

    pub fn with_installments(mut self, count: u32) -> Self {
        self.installment_count = count;
        self
    }

    pub fn with_term_days(mut self, days: u32) -> Self {
        self.term_days = days;
        self
    }

    pub fn skipping_weekends(mut self, skip: bool) -> Self {
        self.skip_weekends = skip;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.principal.is_positive() {
            return Err(LedgerError::invalid_amount(self.principal));
        }
        if self.installment_count == 0 {
            return Err(LedgerError::InvalidConfiguration {
                message: "installment count must be at least 1".to_string(),
            });
        }
        if self.term_days == 0 {
            return Err(LedgerError::InvalidConfiguration {
                message: "term must be at least one day".to_string(),
            });
        }
        self.policy.validate()
    }
}

/// pristine installments for a new loan
pub fn build_installments(terms: &LoanTerms, modality: Modality) -> Result<Vec<Installment>> {
    terms.validate()?;

    match modality {
        Modality::Monthly => monthly_installments(terms),
        Modality::DailyFree | Modality::Legacy => {
            let due = calendar::add_days(terms.start_date, i64::from(terms.term_days), terms.skip_weekends)?;
            Ok(vec![Installment::new(1, terms.start_date, due, terms.principal, Money::ZERO)])
        }
        Modality::DailyFixedTerm => {
            let due = calendar::add_days(terms.start_date, i64::from(terms.term_days), terms.skip_weekends)?;
            let fee = terms.principal.percentage(terms.policy.interest_rate);
            Ok(vec![Installment::new(1, terms.start_date, due, terms.principal, fee)])
        }
    }
}

fn monthly_installments(terms: &LoanTerms) -> Result<Vec<Installment>> {
    let count = terms.installment_count;
    let share = terms.principal / Decimal::from(count);
    // last installment absorbs the rounding remainder
    let last_share = terms.principal - share.times(i64::from(count - 1));

    (1..=count)
        .map(|number| {
            let start = calendar::add_calendar_months(terms.start_date, month_offset(number - 1)?)?;
            let due = calendar::add_calendar_months(terms.start_date, month_offset(number)?)?;
            let principal = if number == count { last_share } else { share };
            let interest = principal.percentage(terms.policy.interest_rate);
            Ok(Installment::new(number, start, due, principal, interest))
        })
        .collect()
}

fn month_offset(months: u32) -> Result<i32> {
    i32::try_from(months).map_err(|_| LedgerError::InvalidConfiguration {
        message: format!("{} months is out of range", months),
    })
}

/// new loan for a stored modality tag, with its policy frozen
pub fn originate(terms: &LoanTerms, billing_cycle: &str) -> Result<Loan> {
    let modality = ModalityRegistry::standard().get(billing_cycle);
    let installments = build_installments(terms, modality)?;
    Ok(Loan::new(terms.principal, terms.policy, billing_cycle, terms.start_date, installments).with_frozen_policy())
}
