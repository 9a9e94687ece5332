use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::modality::CalculationResult;

/// debt buckets in the order a payment reaches them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WaterfallBucket {
    LateFee = 1,
    Interest = 2,
    Principal = 3,
}

/// penalties first, then interest, then principal; whatever is left is residual
pub const WATERFALL_ORDER: [WaterfallBucket; 3] = [
    WaterfallBucket::LateFee,
    WaterfallBucket::Interest,
    WaterfallBucket::Principal,
];

/// how a payment was split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAllocation {
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub late_fee_paid: Money,
    /// paid beyond the current obligation, available for voluntary amortization
    pub av_generated: Money,
}

impl PaymentAllocation {
    /// amount that went into debt buckets
    pub fn total_applied(&self) -> Money {
        self.late_fee_paid + self.interest_paid + self.principal_paid
    }

    /// whole payment including residual
    pub fn total(&self) -> Money {
        self.total_applied() + self.av_generated
    }

    fn bucket_mut(&mut self, bucket: WaterfallBucket) -> &mut Money {
        match bucket {
            WaterfallBucket::LateFee => &mut self.late_fee_paid,
            WaterfallBucket::Interest => &mut self.interest_paid,
            WaterfallBucket::Principal => &mut self.principal_paid,
        }
    }
}

fn owed(debt: &CalculationResult, bucket: WaterfallBucket) -> Money {
    match bucket {
        WaterfallBucket::LateFee => debt.late_fee,
        WaterfallBucket::Interest => debt.interest,
        WaterfallBucket::Principal => debt.principal,
    }
}

/// split a payment across late fee, interest and principal
///
/// Negative payments and negative debt buckets are rejected before anything is allocated.
pub fn allocate_payment(amount: Money, debt: &CalculationResult) -> Result<PaymentAllocation> {
    if amount.is_negative() {
        return Err(LedgerError::invalid_amount(amount));
    }
    for bucket in WATERFALL_ORDER {
        let balance = owed(debt, bucket);
        if balance.is_negative() {
            return Err(LedgerError::InvalidAmount {
                amount: format!("{:?} balance {}", bucket, balance),
            });
        }
    }

    let mut remaining = amount;
    let mut allocation = PaymentAllocation::default();

    for bucket in WATERFALL_ORDER {
        let applied = remaining.min(owed(debt, bucket));
        *allocation.bucket_mut(bucket) = applied;
        remaining -= applied;
    }

    allocation.av_generated = remaining;
    Ok(allocation)
}

/// same as [`allocate_payment`] for amounts arriving as floats
pub fn allocate_payment_f64(amount: f64, debt: &CalculationResult) -> Result<PaymentAllocation> {
    allocate_payment(Money::try_from_f64(amount)?, debt)
}
