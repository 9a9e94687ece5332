//! Payment flow over a loan.
//!
//! replay -> calculate -> allocate -> settle or renew -> append entry -> rebase -> replay.
//! Every call takes a loan and returns a new one; nothing is mutated in place.

use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::calculator::{self, DebtCalculator};
use crate::calendar;
use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::ledger::LedgerEntry;
use crate::loan::{Installment, Loan};
use crate::modality::{dispatch, CalculationResult, RenewalRequest, RenewalResult};
use crate::payments::{allocate_payment, entry_type_for, PaymentAllocation};
use crate::replay::{self, ReplayOutcome, ReplayWarning};
use crate::types::{InstallmentId, LedgerEntryType};

/// operator choices attached to a payment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOptions {
    /// anchor the next cycle on the payment day instead of the lapsed due date
    #[serde(default)]
    pub forgive_penalty: bool,
    #[serde(default)]
    pub manual_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PaymentOptions {
    pub fn forgiving_penalty(mut self) -> Self {
        self.forgive_penalty = true;
        self
    }

    pub fn with_manual_date(mut self, date: NaiveDate) -> Self {
        self.manual_date = Some(date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// everything a payment produced
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOutcome {
    /// debt at the moment of payment
    pub debt: CalculationResult,
    pub allocation: PaymentAllocation,
    /// absent when the payment settled the installment
    pub renewal: Option<RenewalResult>,
    /// entry appended to the ledger
    pub entry: LedgerEntry,
    /// adjustment clearing a residual under the settlement threshold
    pub write_off: Option<LedgerEntry>,
    /// replayed loan including the new entry and schedule
    pub loan: Loan,
    pub warnings: Vec<ReplayWarning>,
}

impl PaymentOutcome {
    pub fn settled(&self) -> bool {
        self.renewal.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoanEngine {
    calculator: DebtCalculator,
}

impl LoanEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            calculator: DebtCalculator::new(config),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        self.calculator.config()
    }

    pub fn replay(&self, loan: &Loan, today: NaiveDate) -> ReplayOutcome {
        replay::rebuild_loan_state_from_ledger(loan, today)
    }

    /// current debt of one installment
    pub fn quote(&self, loan: &Loan, installment_id: InstallmentId, today: NaiveDate) -> Result<CalculationResult> {
        let replayed = replay::replay(loan, today);
        let installment = find(&replayed, installment_id)?;
        self.calculator.calculate_total_due(&replayed, installment, today)
    }

    pub fn quote_now(
        &self,
        loan: &Loan,
        installment_id: InstallmentId,
        time_provider: &SafeTimeProvider,
    ) -> Result<CalculationResult> {
        self.quote(loan, installment_id, calendar::today(time_provider))
    }

    /// apply a payment made at `at` to one installment
    pub fn pay(
        &self,
        loan: &Loan,
        installment_id: InstallmentId,
        amount: Money,
        options: PaymentOptions,
        at: DateTime<Utc>,
    ) -> Result<PaymentOutcome> {
        if !amount.is_positive() {
            return Err(LedgerError::invalid_amount(amount));
        }

        let today = calendar::entry_day(at);
        let replayed = replay::replay(loan, today);
        let installment = find(&replayed, installment_id)?;

        let debt = self.calculator.calculate_total_due(&replayed, installment, today)?;
        let allocation = allocate_payment(amount, &debt)?;
        let settles = self.config().is_effectively_zero((debt.total - amount).non_negative());

        let (entry_type, principal_delta, interest_delta, renewal) = if settles {
            (
                LedgerEntryType::PaymentFull,
                allocation.principal_paid,
                allocation.interest_paid,
                None,
            )
        } else {
            let request = RenewalRequest::new(amount, allocation, today)
                .forgiving_penalty(options.forgive_penalty)
                .with_manual_date(options.manual_date);
            let policy = calculator::resolve_policy(&replayed);
            let renewal = dispatch::renew(&replayed.billing_cycle, installment, &policy, &request, self.config())?;
            if renewal.new_principal_remaining.is_negative() || renewal.new_interest_remaining.is_negative() {
                return Err(LedgerError::CalculationError {
                    message: format!(
                        "renewal of installment {} left a negative balance: principal {}, interest {}",
                        installment_id, renewal.new_principal_remaining, renewal.new_interest_remaining
                    ),
                });
            }
            (
                entry_type_for(&allocation, &debt, false),
                renewal.principal_delta,
                renewal.interest_delta,
                Some(renewal),
            )
        };

        let notes = options.notes.clone().unwrap_or_else(|| describe(&allocation));
        let entry = LedgerEntry::payment(
            entry_type,
            installment_id,
            at,
            amount,
            principal_delta,
            interest_delta,
            allocation.late_fee_paid,
        )
        .with_notes(notes);

        log::debug!(
            "{:?} of {} on installment {} of loan {}",
            entry.entry_type,
            amount,
            installment_id,
            loan.id
        );

        let write_off = if settles {
            residual_write_off(installment, &allocation, at)
        } else {
            None
        };

        let mut next = replayed.clone();
        next.record(entry.clone());
        if let Some(write_off) = &write_off {
            next.record(write_off.clone());
        }
        if let Some(renewal) = &renewal {
            next.reschedule(installment_id, renewal);
        }
        let ReplayOutcome { loan: next, warnings } = replay::rebuild_loan_state_from_ledger(&next, today);

        Ok(PaymentOutcome {
            debt,
            allocation,
            renewal,
            entry,
            write_off,
            loan: next,
            warnings,
        })
    }

    pub fn pay_now(
        &self,
        loan: &Loan,
        installment_id: InstallmentId,
        amount: Money,
        options: PaymentOptions,
        time_provider: &SafeTimeProvider,
    ) -> Result<PaymentOutcome> {
        self.pay(loan, installment_id, amount, options, time_provider.now())
    }

    /// lend more principal against an installment
    pub fn lend_more(
        &self,
        loan: &Loan,
        installment_id: InstallmentId,
        amount: Money,
        at: DateTime<Utc>,
    ) -> Result<ReplayOutcome> {
        if !amount.is_positive() {
            return Err(LedgerError::invalid_amount(amount));
        }
        find(loan, installment_id)?;

        let mut next = loan.clone();
        next.record(LedgerEntry::disbursement(installment_id, at, amount));
        Ok(replay::rebuild_loan_state_from_ledger(&next, calendar::entry_day(at)))
    }
}

fn find(loan: &Loan, installment_id: InstallmentId) -> Result<&Installment> {
    loan.installment(installment_id)
        .ok_or(LedgerError::InstallmentNotFound { id: installment_id })
}

/// adjustment for what a settling payment left unpaid, so paid totals stay equal to cash
fn residual_write_off(installment: &Installment, allocation: &PaymentAllocation, at: DateTime<Utc>) -> Option<LedgerEntry> {
    let principal = (installment.principal_remaining() - allocation.principal_paid).non_negative();
    let interest = (installment.interest_remaining() - allocation.interest_paid).non_negative();
    if principal.is_zero() && interest.is_zero() {
        return None;
    }

    Some(
        LedgerEntry::new(LedgerEntryType::Adjustment, at, Money::ZERO)
            .for_installment(installment.id)
            .with_deltas(principal, interest, Money::ZERO)
            .with_notes(format!("residual {} written off on settlement", principal + interest)),
    )
}

fn describe(allocation: &PaymentAllocation) -> String {
    let mut notes = format!(
        "paid {}: late fee {}, interest {}, principal {}",
        allocation.total(),
        allocation.late_fee_paid,
        allocation.interest_paid,
        allocation.principal_paid
    );
    if allocation.av_generated.is_positive() {
        notes.push_str(&format!(", amortized {}", allocation.av_generated));
    }
    notes
}
