pub mod waterfall;

use crate::modality::CalculationResult;
use crate::types::LedgerEntryType;

pub use waterfall::{
    allocate_payment, allocate_payment_f64, PaymentAllocation, WaterfallBucket, WATERFALL_ORDER,
};

/// ledger entry type that records a payment
pub fn entry_type_for(allocation: &PaymentAllocation, debt: &CalculationResult, settles: bool) -> LedgerEntryType {
    if settles {
        LedgerEntryType::PaymentFull
    } else if allocation.principal_paid.is_zero()
        && allocation.av_generated.is_zero()
        && allocation.interest_paid.is_positive()
        && debt.principal.is_positive()
    {
        LedgerEntryType::PaymentInterestOnly
    } else {
        LedgerEntryType::PaymentPartial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;

    #[test]
    fn test_entry_type_classification() {
        let debt = CalculationResult::new(Money::from_major(100), Money::from_major(10), Money::ZERO, Money::from_major(110), 0);

        let interest_only = allocate_payment(Money::from_major(10), &debt).unwrap();
        assert_eq!(entry_type_for(&interest_only, &debt, false), LedgerEntryType::PaymentInterestOnly);

        let partial = allocate_payment(Money::from_major(40), &debt).unwrap();
        assert_eq!(entry_type_for(&partial, &debt, false), LedgerEntryType::PaymentPartial);

        let full = allocate_payment(Money::from_major(110), &debt).unwrap();
        assert_eq!(entry_type_for(&full, &debt, true), LedgerEntryType::PaymentFull);
    }
}
