//! Billing modalities.
//!
//! Each modality is a pair of pure functions, `calculate` and `renew`, living in its own
//! module. `Modality` is the closed set of variants and dispatches to them with a plain
//! match; which stored tag selects which variant is data in [`registry`].

pub mod daily_free;
pub mod dispatch;
pub mod fixed_term;
pub mod legacy;
pub mod monthly;
pub mod registry;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{EngineConfig, Policy};
use crate::decimal::Money;
use crate::errors::Result;
use crate::loan::Installment;
use crate::payments::PaymentAllocation;

pub use registry::{ModalityRegistry, ModalityResolution};

/// billing rule-set governing accrual and renewal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modality {
    /// simple interest per 30-day cycle, fine plus daily late interest when overdue
    Monthly,
    /// open-ended daily accrual past the covered-through date
    DailyFree,
    /// single installment with a flat fee and a fixed due date
    DailyFixedTerm,
    /// retired tags: daily calculation, monthly renewal
    Legacy,
}

impl Modality {
    pub const ALL: [Modality; 4] = [
        Modality::Monthly,
        Modality::DailyFree,
        Modality::DailyFixedTerm,
        Modality::Legacy,
    ];

    /// canonical stored tag
    pub fn tag(&self) -> &'static str {
        match self {
            Modality::Monthly => "MONTHLY",
            Modality::DailyFree => "DAILY_FREE",
            Modality::DailyFixedTerm => "DAILY_FIXED_TERM",
            Modality::Legacy => "LEGACY",
        }
    }

    /// amount owed on an installment as of `today`
    pub fn calculate(
        &self,
        installment: &Installment,
        policy: &Policy,
        today: NaiveDate,
        config: &EngineConfig,
    ) -> CalculationResult {
        match self {
            Modality::Monthly => monthly::calculate(installment, policy, today),
            Modality::DailyFree => daily_free::calculate(installment, policy, today, config),
            Modality::DailyFixedTerm => fixed_term::calculate(installment, policy, today),
            Modality::Legacy => legacy::calculate(installment, policy, today, config),
        }
    }

    /// next schedule for an installment that was paid without being settled
    pub fn renew(
        &self,
        installment: &Installment,
        policy: &Policy,
        request: &RenewalRequest,
        config: &EngineConfig,
    ) -> Result<RenewalResult> {
        match self {
            Modality::Monthly => monthly::renew(installment, policy, request, config),
            Modality::DailyFree => daily_free::renew(installment, policy, request, config),
            Modality::DailyFixedTerm => fixed_term::renew(installment, request),
            Modality::Legacy => legacy::renew(installment, policy, request, config),
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// point-in-time debt of one installment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub total: Money,
    pub principal: Money,
    pub interest: Money,
    pub late_fee: Money,
    /// balance the fine was computed on
    pub base_for_fine: Money,
    pub days_late: i64,
}

impl CalculationResult {
    pub fn new(
        principal: Money,
        interest: Money,
        late_fee: Money,
        base_for_fine: Money,
        days_late: i64,
    ) -> Self {
        Self {
            total: principal + interest + late_fee,
            principal,
            interest,
            late_fee,
            base_for_fine,
            days_late,
        }
    }

    pub fn is_late(&self) -> bool {
        self.days_late > 0
    }
}

/// inputs of a rollover decision
#[derive(Debug, Clone, PartialEq)]
pub struct RenewalRequest {
    pub amount_paid: Money,
    pub allocation: PaymentAllocation,
    pub today: NaiveDate,
    /// ignore overdue days when choosing the new anchor date
    pub forgive_penalty: bool,
    /// operator-chosen due date overriding the computed one
    pub manual_date: Option<NaiveDate>,
}

impl RenewalRequest {
    pub fn new(amount_paid: Money, allocation: PaymentAllocation, today: NaiveDate) -> Self {
        Self {
            amount_paid,
            allocation,
            today,
            forgive_penalty: false,
            manual_date: None,
        }
    }

    pub fn forgiving_penalty(mut self, forgive: bool) -> Self {
        self.forgive_penalty = forgive;
        self
    }

    pub fn with_manual_date(mut self, date: Option<NaiveDate>) -> Self {
        self.manual_date = date;
        self
    }

    /// date the next cycle counts from: the current due date, or today when an overdue
    /// penalty is forgiven
    pub fn anchor(&self, due_date: NaiveDate) -> NaiveDate {
        if self.forgive_penalty && due_date < self.today {
            self.today
        } else {
            due_date
        }
    }
}

/// next schedule of a renewed installment
///
/// `principal_delta` and `interest_delta` are what the accompanying ledger entry records.
/// The scheduled values are rebased so that replaying the full ledger, including that entry,
/// over them lands exactly on the new remaining balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalResult {
    pub new_start_date: NaiveDate,
    pub new_due_date: NaiveDate,
    pub new_principal_remaining: Money,
    pub new_interest_remaining: Money,
    pub new_scheduled_principal: Money,
    pub new_scheduled_interest: Money,
    /// total due for the new period
    pub new_amount: Money,
    pub principal_delta: Money,
    pub interest_delta: Money,
}

impl RenewalResult {
    /// build from the post-replay installment and the balances it should end up with
    pub(crate) fn rebased(
        installment: &Installment,
        new_start_date: NaiveDate,
        new_due_date: NaiveDate,
        new_principal_remaining: Money,
        new_interest_remaining: Money,
        principal_delta: Money,
        interest_delta: Money,
    ) -> Self {
        // replay alone would leave these balances after the new entry
        let replayed_principal = (installment.principal_remaining() - principal_delta).non_negative();
        let replayed_interest = (installment.interest_remaining() - interest_delta).non_negative();

        let new_scheduled_principal =
            installment.scheduled_principal + (new_principal_remaining - replayed_principal);
        let new_scheduled_interest =
            installment.scheduled_interest + (new_interest_remaining - replayed_interest);

        Self {
            new_start_date,
            new_due_date,
            new_principal_remaining,
            new_interest_remaining,
            new_scheduled_principal,
            new_scheduled_interest,
            new_amount: new_principal_remaining + new_interest_remaining,
            principal_delta,
            interest_delta,
        }
    }

    pub fn moved_due_date(&self, installment: &Installment) -> bool {
        self.new_due_date != installment.due_date
    }
}
