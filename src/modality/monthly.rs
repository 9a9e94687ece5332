//! Monthly simple interest.
//!
//! Interest for a cycle is `principal * rate%`. Once overdue the installment carries a fine
//! on principal plus interest and daily late interest on the same base, less any late fee
//! already paid since the due date passed. Renewal advances the due date in whole 30-day
//! blocks, one per full month of interest paid.

use chrono::NaiveDate;

use crate::calendar;
use crate::config::{EngineConfig, Policy};
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::loan::Installment;

use super::{CalculationResult, RenewalRequest, RenewalResult};

pub fn calculate(installment: &Installment, policy: &Policy, today: NaiveDate) -> CalculationResult {
    let principal = installment.principal_remaining();
    let interest = installment.interest_remaining();
    let base = principal + interest;
    let days_late = calendar::days_late(today, installment.due_date);

    let late_fee = if days_late > 0 {
        let fine = base.percentage(policy.fine_percent);
        let late_interest = base.percentage(policy.daily_interest_percent.scaled(days_late));
        (fine + late_interest - installment.paid_late_fee_since_due()).non_negative()
    } else {
        Money::ZERO
    };

    CalculationResult::new(principal, interest, late_fee, base, days_late)
}

/// interest of one full cycle on the current principal
pub fn one_month_interest(installment: &Installment, policy: &Policy) -> Money {
    installment.principal_remaining().percentage(policy.interest_rate)
}

/// whole months of interest covered by what was paid, with the configured tolerance
pub fn months_covered(interest_paid: Money, one_month: Money, tolerance: Money) -> i64 {
    if !one_month.is_positive() || !interest_paid.is_positive() {
        return 0;
    }
    (interest_paid + tolerance).whole_units_of(one_month)
}

pub fn renew(
    installment: &Installment,
    policy: &Policy,
    request: &RenewalRequest,
    config: &EngineConfig,
) -> Result<RenewalResult> {
    let allocation = &request.allocation;
    let principal_before = installment.principal_remaining();
    let interest_before = installment.interest_remaining();

    let one_month = one_month_interest(installment, policy);
    let months = months_covered(allocation.interest_paid, one_month, config.renewal_tolerance);

    let principal_delta = (allocation.principal_paid + allocation.av_generated).min(principal_before);
    let interest_delta = allocation.interest_paid;
    let new_principal = (principal_before - principal_delta).non_negative();
    let unpaid_interest = (interest_before - interest_delta).non_negative();

    let (new_start, computed_due, new_interest) = if months >= 1 {
        let cycle = i64::from(config.days_per_cycle);
        let anchor = request.anchor(installment.due_date);
        let shift = cycle.checked_mul(months).ok_or_else(|| LedgerError::InvalidDate {
            input: format!("{} + {} cycles of {} days", anchor, months, cycle),
        })?;
        let due = calendar::add_days(anchor, shift, false)?;
        let start = calendar::add_days(due, -cycle, false)?;
        // a shortfall inside the tolerance is absorbed, anything larger stays owed
        let carried = if unpaid_interest <= config.renewal_tolerance {
            Money::ZERO
        } else {
            unpaid_interest
        };
        (start, due, new_principal.percentage(policy.interest_rate) + carried)
    } else {
        (installment.start_date, installment.due_date, unpaid_interest)
    };

    let new_due = request.manual_date.unwrap_or(computed_due);

    log::debug!(
        "monthly renewal of installment {}: {} month(s) covered, due {} -> {}",
        installment.id,
        months,
        installment.due_date,
        new_due
    );

    Ok(RenewalResult::rebased(
        installment,
        new_start.min(new_due),
        new_due,
        new_principal,
        new_interest,
        principal_delta,
        interest_delta,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::modality::test_support::*;
    use crate::payments::PaymentAllocation;
    use crate::types::InstallmentStatus;
    use rust_decimal_macros::dec;

    fn policy() -> Policy {
        Policy::new(
            Rate::from_percentage(10),
            Rate::from_percentage(2),
            Rate::from_percentage(1),
        )
    }

    #[test]
    fn test_late_installment_worked_example() {
        let today = d(2024, 6, 10);
        let mut inst = installment_with(Money::from_major(100), Money::from_major(10), d(2024, 5, 6), d(2024, 6, 5));
        inst.status = InstallmentStatus::Late;

        let result = calculate(&inst, &policy(), today);

        assert_eq!(result.days_late, 5);
        assert_eq!(result.base_for_fine, Money::from_major(110));
        assert_eq!(result.late_fee, Money::from_minor(770));
        assert_eq!(result.total, Money::from_minor(11770));
    }

    #[test]
    fn test_late_fee_paid_is_not_charged_again() {
        let mut inst = installment_with(Money::from_major(100), Money::from_major(10), d(2024, 5, 6), d(2024, 6, 5));
        inst.paid_late_fee_since_due = Money::from_minor(770);

        let same_day = calculate(&inst, &policy(), d(2024, 6, 10));
        assert_eq!(same_day.late_fee, Money::ZERO);
        assert_eq!(same_day.total, Money::from_major(110));

        // the next day only adds one more day of late interest
        let next_day = calculate(&inst, &policy(), d(2024, 6, 11));
        assert_eq!(next_day.late_fee, Money::from_minor(110));
    }

    #[test]
    fn test_runaway_renewal_is_an_error() {
        // one cent of interest a month against a huge carried balance
        let inst = installment_with(
            Money::from_minor(5),
            Money::from_major(1_000_000_000_000_000),
            d(2024, 5, 6),
            d(2024, 6, 5),
        );
        let allocation = PaymentAllocation {
            interest_paid: Money::from_major(1_000_000_000_000_000),
            ..Default::default()
        };
        let request = RenewalRequest::new(allocation.interest_paid, allocation, d(2024, 6, 5));

        assert!(matches!(
            renew(&inst, &policy(), &request, &EngineConfig::default()),
            Err(LedgerError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_on_time_has_no_late_fee() {
        let inst = installment_with(Money::from_major(100), Money::from_major(10), d(2024, 5, 6), d(2024, 6, 5));

        let on_due = calculate(&inst, &policy(), d(2024, 6, 5));
        assert_eq!(on_due.days_late, 0);
        assert_eq!(on_due.late_fee, Money::ZERO);
        assert_eq!(on_due.total, Money::from_major(110));

        let early = calculate(&inst, &policy(), d(2024, 6, 1));
        assert_eq!(early.days_late, 0);
    }

    #[test]
    fn test_months_covered_tolerance() {
        let one_month = Money::from_major(10);
        let tolerance = Money::ONE;
        assert_eq!(months_covered(Money::from_major(10), one_month, tolerance), 1);
        assert_eq!(months_covered(Money::from_minor(950), one_month, tolerance), 1);
        assert_eq!(months_covered(Money::from_minor(899), one_month, tolerance), 0);
        assert_eq!(months_covered(Money::from_major(20), one_month, tolerance), 2);
        assert_eq!(months_covered(Money::ZERO, one_month, tolerance), 0);
        assert_eq!(months_covered(Money::from_major(10), Money::ZERO, tolerance), 0);
    }

    #[test]
    fn test_interest_only_payment_advances_one_block() {
        let inst = installment_with(Money::from_major(100), Money::from_major(10), d(2024, 5, 6), d(2024, 6, 5));
        let allocation = PaymentAllocation {
            interest_paid: Money::from_major(10),
            ..Default::default()
        };
        let request = RenewalRequest::new(Money::from_major(10), allocation, d(2024, 6, 5));

        let renewal = renew(&inst, &policy(), &request, &EngineConfig::default()).unwrap();

        assert_eq!(renewal.new_due_date, d(2024, 7, 5));
        assert_eq!(renewal.new_start_date, d(2024, 6, 5));
        assert_eq!(renewal.new_principal_remaining, Money::from_major(100));
        assert_eq!(renewal.new_interest_remaining, Money::from_major(10));
        assert_eq!(renewal.interest_delta, Money::from_major(10));
        assert_eq!(renewal.new_amount, Money::from_major(110));
    }

    #[test]
    fn test_underpaid_interest_keeps_due_date() {
        let inst = installment_with(Money::from_major(100), Money::from_major(10), d(2024, 5, 6), d(2024, 6, 5));
        let allocation = PaymentAllocation {
            interest_paid: Money::from_major(6),
            ..Default::default()
        };
        let request = RenewalRequest::new(Money::from_major(6), allocation, d(2024, 6, 5));

        let renewal = renew(&inst, &policy(), &request, &EngineConfig::default()).unwrap();

        assert_eq!(renewal.new_due_date, d(2024, 6, 5));
        assert_eq!(renewal.new_interest_remaining, Money::from_major(4));
        assert_eq!(renewal.new_scheduled_interest, Money::from_major(10));
    }

    #[test]
    fn test_shortfall_within_tolerance_is_absorbed() {
        let inst = installment_with(Money::from_major(100), Money::from_major(10), d(2024, 5, 6), d(2024, 6, 5));
        let allocation = PaymentAllocation {
            interest_paid: Money::from_decimal(dec!(9.40)),
            ..Default::default()
        };
        let request = RenewalRequest::new(allocation.interest_paid, allocation, d(2024, 6, 5));

        let renewal = renew(&inst, &policy(), &request, &EngineConfig::default()).unwrap();

        assert_eq!(renewal.new_due_date, d(2024, 7, 5));
        assert_eq!(renewal.new_interest_remaining, Money::from_major(10));
    }

    #[test]
    fn test_principal_and_interest_payment_recomputes_interest() {
        let inst = installment_with(Money::from_major(100), Money::from_major(10), d(2024, 5, 6), d(2024, 6, 5));
        let allocation = PaymentAllocation {
            interest_paid: Money::from_major(10),
            principal_paid: Money::from_major(40),
            ..Default::default()
        };
        let request = RenewalRequest::new(Money::from_major(50), allocation, d(2024, 6, 5));

        let renewal = renew(&inst, &policy(), &request, &EngineConfig::default()).unwrap();

        assert_eq!(renewal.new_principal_remaining, Money::from_major(60));
        assert_eq!(renewal.new_interest_remaining, Money::from_major(6));
        assert_eq!(renewal.principal_delta, Money::from_major(40));
        assert_eq!(renewal.new_scheduled_principal, Money::from_major(100));
    }

    #[test]
    fn test_forgiven_late_renewal_anchors_on_today() {
        let inst = installment_with(Money::from_major(100), Money::from_major(10), d(2024, 5, 6), d(2024, 6, 5));
        let allocation = PaymentAllocation {
            interest_paid: Money::from_major(10),
            ..Default::default()
        };
        let today = d(2024, 6, 20);

        let strict = RenewalRequest::new(Money::from_major(10), allocation.clone(), today);
        let renewal = renew(&inst, &policy(), &strict, &EngineConfig::default()).unwrap();
        assert_eq!(renewal.new_due_date, d(2024, 7, 5));

        let forgiving = RenewalRequest::new(Money::from_major(10), allocation, today).forgiving_penalty(true);
        let renewal = renew(&inst, &policy(), &forgiving, &EngineConfig::default()).unwrap();
        assert_eq!(renewal.new_due_date, d(2024, 7, 20));
    }

    #[test]
    fn test_manual_date_overrides() {
        let inst = installment_with(Money::from_major(100), Money::from_major(10), d(2024, 5, 6), d(2024, 6, 5));
        let allocation = PaymentAllocation {
            interest_paid: Money::from_major(10),
            ..Default::default()
        };
        let request = RenewalRequest::new(Money::from_major(10), allocation, d(2024, 6, 5))
            .with_manual_date(Some(d(2024, 7, 15)));

        let renewal = renew(&inst, &policy(), &request, &EngineConfig::default()).unwrap();
        assert_eq!(renewal.new_due_date, d(2024, 7, 15));
    }
}
