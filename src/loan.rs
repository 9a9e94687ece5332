use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar;
use crate::config::Policy;
use crate::decimal::{Money, Rate};
use crate::ledger::{Ledger, LedgerEntry};
use crate::modality::RenewalResult;
use crate::types::{InstallmentId, InstallmentStatus, LoanId};

/// one billing period, or the whole term for single-installment modalities
///
/// Scheduled fields are inputs. Balances, paid accumulators, status, renewal count, paid date
/// and logs are produced by ledger replay and only the replay fold writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub id: InstallmentId,
    pub number: u32,
    /// first day of the period the installment covers
    #[serde(with = "calendar::serde_date")]
    pub start_date: NaiveDate,
    #[serde(with = "calendar::serde_date")]
    pub due_date: NaiveDate,
    /// originally scheduled total
    pub amount: Money,
    pub scheduled_principal: Money,
    pub scheduled_interest: Money,

    // derived by replay
    #[serde(default)]
    pub(crate) principal_remaining: Money,
    #[serde(default)]
    pub(crate) interest_remaining: Money,
    #[serde(default)]
    pub(crate) late_fee_accrued: Money,
    #[serde(default)]
    pub(crate) paid_principal: Money,
    #[serde(default)]
    pub(crate) paid_interest: Money,
    #[serde(default)]
    pub(crate) paid_late_fee: Money,
    #[serde(default)]
    pub(crate) paid_total: Money,
    /// late fees paid after the current due date had passed
    #[serde(default)]
    pub(crate) paid_late_fee_since_due: Money,
    #[serde(default)]
    pub(crate) status: InstallmentStatus,
    #[serde(default)]
    pub(crate) renewal_count: u32,
    #[serde(default, with = "calendar::serde_date::option")]
    pub(crate) paid_date: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) logs: Vec<String>,
}

impl Installment {
    /// pristine installment with nothing paid
    pub fn new(
        number: u32,
        start_date: NaiveDate,
        due_date: NaiveDate,
        scheduled_principal: Money,
        scheduled_interest: Money,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            start_date,
            due_date,
            amount: scheduled_principal + scheduled_interest,
            scheduled_principal,
            scheduled_interest,
            principal_remaining: scheduled_principal,
            interest_remaining: scheduled_interest,
            late_fee_accrued: Money::ZERO,
            paid_principal: Money::ZERO,
            paid_interest: Money::ZERO,
            paid_late_fee: Money::ZERO,
            paid_total: Money::ZERO,
            paid_late_fee_since_due: Money::ZERO,
            status: InstallmentStatus::Pending,
            renewal_count: 0,
            paid_date: None,
            logs: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: InstallmentId) -> Self {
        self.id = id;
        self
    }

    /// same schedule with every derived field reset
    pub fn pristine(&self) -> Self {
        Self {
            id: self.id,
            number: self.number,
            start_date: self.start_date,
            due_date: self.due_date,
            amount: self.amount,
            scheduled_principal: self.scheduled_principal,
            scheduled_interest: self.scheduled_interest,
            principal_remaining: self.scheduled_principal,
            interest_remaining: self.scheduled_interest,
            late_fee_accrued: Money::ZERO,
            paid_principal: Money::ZERO,
            paid_interest: Money::ZERO,
            paid_late_fee: Money::ZERO,
            paid_total: Money::ZERO,
            paid_late_fee_since_due: Money::ZERO,
            status: InstallmentStatus::Pending,
            renewal_count: 0,
            paid_date: None,
            logs: Vec::new(),
        }
    }

    /// new pristine schedule after a rollover; replay must run afterwards
    pub fn apply_renewal(&self, renewal: &RenewalResult) -> Self {
        let mut next = self.clone();
        next.start_date = renewal.new_start_date;
        next.due_date = renewal.new_due_date;
        next.scheduled_principal = renewal.new_scheduled_principal;
        next.scheduled_interest = renewal.new_scheduled_interest;
        next.amount = renewal.new_amount;
        next.pristine()
    }

    pub fn principal_remaining(&self) -> Money {
        self.principal_remaining
    }

    pub fn interest_remaining(&self) -> Money {
        self.interest_remaining
    }

    /// late fee as of the last calculation, not a running total
    pub fn late_fee_accrued(&self) -> Money {
        self.late_fee_accrued
    }

    pub fn paid_principal(&self) -> Money {
        self.paid_principal
    }

    pub fn paid_interest(&self) -> Money {
        self.paid_interest
    }

    pub fn paid_late_fee(&self) -> Money {
        self.paid_late_fee
    }

    pub fn paid_total(&self) -> Money {
        self.paid_total
    }

    /// late fees already paid against the lateness of the current due date
    pub fn paid_late_fee_since_due(&self) -> Money {
        self.paid_late_fee_since_due
    }

    pub fn status(&self) -> InstallmentStatus {
        self.status
    }

    pub fn renewal_count(&self) -> u32 {
        self.renewal_count
    }

    pub fn paid_date(&self) -> Option<NaiveDate> {
        self.paid_date
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn outstanding(&self) -> Money {
        self.principal_remaining + self.interest_remaining
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        calendar::days_between(today, self.due_date) > 0
    }
}

/// loan aggregate: schedule, append-only ledger and the rates it was written under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: LoanId,
    pub principal: Money,
    pub interest_rate: Rate,
    pub fine_percent: Rate,
    pub daily_interest_percent: Rate,
    /// billing modality tag as stored; resolved through the modality registry
    pub billing_cycle: String,
    #[serde(with = "calendar::serde_date")]
    pub start_date: NaiveDate,
    pub total_to_receive: Money,
    pub installments: Vec<Installment>,
    #[serde(default)]
    pub ledger: Ledger,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub policies_snapshot: Option<Policy>,
}

impl Loan {
    pub fn new(
        principal: Money,
        policy: Policy,
        billing_cycle: impl Into<String>,
        start_date: NaiveDate,
        installments: Vec<Installment>,
    ) -> Self {
        let total_to_receive = installments.iter().map(|i| i.amount).sum();
        Self {
            id: Uuid::new_v4(),
            principal,
            interest_rate: policy.interest_rate,
            fine_percent: policy.fine_percent,
            daily_interest_percent: policy.daily_interest_percent,
            billing_cycle: billing_cycle.into(),
            start_date,
            total_to_receive,
            installments,
            ledger: Ledger::new(),
            is_archived: false,
            policies_snapshot: None,
        }
    }

    /// freeze the current rates so later default changes cannot reach this loan
    pub fn with_frozen_policy(mut self) -> Self {
        self.policies_snapshot = Some(Policy::new(
            self.interest_rate,
            self.fine_percent,
            self.daily_interest_percent,
        ));
        self
    }

    pub fn with_ledger(mut self, ledger: Ledger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn installment(&self, id: InstallmentId) -> Option<&Installment> {
        self.installments.iter().find(|i| i.id == id)
    }

    pub fn record(&mut self, entry: LedgerEntry) {
        self.ledger.append(entry);
    }

    /// swap in a rebased schedule for one installment
    pub fn reschedule(&mut self, installment_id: InstallmentId, renewal: &RenewalResult) -> bool {
        match self.installments.iter_mut().find(|i| i.id == installment_id) {
            Some(installment) => {
                *installment = installment.apply_renewal(renewal);
                true
            }
            None => false,
        }
    }

    /// soft-remove from active views; the ledger stays intact
    pub fn archive(&mut self) {
        self.is_archived = true;
    }
}
