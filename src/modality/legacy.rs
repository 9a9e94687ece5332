//! Retired modality tags.
//!
//! Records written under tags that no longer exist keep working without a data migration:
//! debt is calculated the daily way and renewals follow the monthly rules.

use chrono::NaiveDate;

use crate::config::{EngineConfig, Policy};
use crate::errors::Result;
use crate::loan::Installment;

use super::{daily_free, monthly, CalculationResult, RenewalRequest, RenewalResult};

pub fn calculate(
    installment: &Installment,
    policy: &Policy,
    today: NaiveDate,
    config: &EngineConfig,
) -> CalculationResult {
    daily_free::calculate(installment, policy, today, config)
}

pub fn renew(
    installment: &Installment,
    policy: &Policy,
    request: &RenewalRequest,
    config: &EngineConfig,
) -> Result<RenewalResult> {
    monthly::renew(installment, policy, request, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::{Money, Rate};
    use crate::modality::test_support::*;
    use crate::payments::PaymentAllocation;

    #[test]
    fn test_calculates_daily_and_renews_monthly() {
        let policy = Policy::new(Rate::from_percentage(30), Rate::from_percentage(2), Rate::from_percentage(1));
        let config = EngineConfig::default();
        let inst = installment_with(Money::from_major(500), Money::ZERO, d(2024, 5, 1), d(2024, 6, 1));

        let debt = calculate(&inst, &policy, d(2024, 6, 3), &config);
        assert_eq!(debt, daily_free::calculate(&inst, &policy, d(2024, 6, 3), &config));
        assert_eq!(debt.interest, Money::from_major(10));

        let allocation = PaymentAllocation {
            interest_paid: Money::from_major(150),
            ..Default::default()
        };
        let request = RenewalRequest::new(Money::from_major(150), allocation, d(2024, 6, 3));
        let renewal = renew(&inst, &policy, &request, &config).unwrap();
        assert_eq!(renewal, monthly::renew(&inst, &policy, &request, &config).unwrap());
        assert_eq!(renewal.new_due_date, d(2024, 7, 1));
    }
}
