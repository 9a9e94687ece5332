//! Fixed-term daily loan with a flat fee.
//!
//! A single installment whose interest is a one-off fee independent of duration. Nothing
//! accrues before the due date; afterwards one flat fine applies, and whatever of it has been
//! paid is never charged again. Payments reduce principal
//! and interest in proportion to their share of the balance and never move the dates.

use chrono::NaiveDate;

use crate::calendar;
use crate::config::Policy;
use crate::decimal::Money;
use crate::errors::Result;
use crate::loan::Installment;

use super::{CalculationResult, RenewalRequest, RenewalResult};

pub fn calculate(installment: &Installment, policy: &Policy, today: NaiveDate) -> CalculationResult {
    let principal = installment.principal_remaining();
    let interest = installment.interest_remaining();
    let base = principal + interest;
    let days_late = calendar::days_late(today, installment.due_date);

    let late_fee = if days_late > 0 {
        (base.percentage(policy.fine_percent) - installment.paid_late_fee_since_due()).non_negative()
    } else {
        Money::ZERO
    };

    CalculationResult::new(principal, interest, late_fee, base, days_late)
}

/// split a paydown between principal and interest by their current ratio
pub fn proportional_split(principal: Money, interest: Money, paydown: Money) -> (Money, Money) {
    let outstanding = principal + interest;
    let paydown = paydown.non_negative().min(outstanding);

    let principal_reduction = match principal.ratio_of(outstanding) {
        Some(share) => (paydown * share).min(principal),
        None => Money::ZERO,
    };
    // interest takes the remainder so no cent is lost to rounding
    let interest_reduction = (paydown - principal_reduction).min(interest);

    (principal_reduction, interest_reduction)
}

pub fn renew(installment: &Installment, request: &RenewalRequest) -> Result<RenewalResult> {
    let principal = installment.principal_remaining();
    let interest = installment.interest_remaining();
    let paydown = request.amount_paid - request.allocation.late_fee_paid;

    let (principal_reduction, interest_reduction) = proportional_split(principal, interest, paydown);

    if request.manual_date.is_some() {
        log::debug!(
            "fixed-term installment {} keeps its dates, manual date ignored",
            installment.id
        );
    }

    Ok(RenewalResult::rebased(
        installment,
        installment.start_date,
        installment.due_date,
        principal - principal_reduction,
        interest - interest_reduction,
        principal_reduction,
        interest_reduction,
    ))
}
