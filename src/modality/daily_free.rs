//! Open-ended daily interest.
//!
//! The due date is the date interest has been paid through. Interest only accrues for days
//! strictly after it, at `rate% / 30` of the remaining principal per day. Paying interest buys
//! whole days forward from the covered-through date, so a borrower can catch up after a gap;
//! what is left over after the last whole day goes to principal.

use chrono::NaiveDate;

use crate::calendar;
use crate::config::{EngineConfig, Policy};
use crate::decimal::Money;
use crate::errors::Result;
use crate::loan::Installment;

use super::{CalculationResult, RenewalRequest, RenewalResult};

/// interest one day costs on the current principal
pub fn daily_cost(principal: Money, policy: &Policy, config: &EngineConfig) -> Money {
    principal.percentage(policy.interest_rate.per_day(config.days_per_cycle))
}

pub fn calculate(
    installment: &Installment,
    policy: &Policy,
    today: NaiveDate,
    config: &EngineConfig,
) -> CalculationResult {
    let principal = installment.principal_remaining();
    let days_late = calendar::days_late(today, installment.due_date);
    let accrued = daily_cost(principal, policy, config).times(days_late);
    let interest = installment.interest_remaining() + accrued;

    CalculationResult::new(principal, interest, Money::ZERO, principal + interest, days_late)
}

pub fn renew(
    installment: &Installment,
    policy: &Policy,
    request: &RenewalRequest,
    config: &EngineConfig,
) -> Result<RenewalResult> {
    let allocation = &request.allocation;
    let principal_before = installment.principal_remaining();
    let cost = daily_cost(principal_before, policy, config);

    // interest carried from earlier short payments is settled before any day is bought
    let carried = installment.interest_remaining();
    let to_carried = allocation.interest_paid.min(carried);
    let purchase = allocation.interest_paid - to_carried;
    let days_bought = purchase.whole_units_of(cost);
    let spent_on_days = cost.times(days_bought).min(purchase);
    // a part of a day cannot move the date, so it is credited to principal
    let day_remainder = purchase - spent_on_days;

    let principal_delta = (allocation.principal_paid + allocation.av_generated + day_remainder).min(principal_before);
    let interest_delta = to_carried + spent_on_days;
    let new_principal = (principal_before - principal_delta).non_negative();

    let anchor = request.anchor(installment.due_date);
    let mut covered_through = calendar::add_days(anchor, days_bought, false)?;

    // pure amortization leaves the date alone unless it already lapsed
    if allocation.interest_paid.is_zero() && principal_delta.is_positive() && covered_through < request.today {
        covered_through = request.today;
    }

    let new_due = request.manual_date.unwrap_or(covered_through);
    let new_start = if new_due == installment.due_date {
        installment.start_date
    } else {
        installment.due_date.min(new_due)
    };

    log::debug!(
        "daily renewal of installment {}: {} day(s) bought at {} per day, covered through {}",
        installment.id,
        days_bought,
        cost,
        new_due
    );

    Ok(RenewalResult::rebased(
        installment,
        new_start,
        new_due,
        new_principal,
        carried - to_carried,
        principal_delta,
        interest_delta,
    ))
}
