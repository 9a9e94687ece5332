use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for an installment
pub type InstallmentId = Uuid;

/// unique identifier for a ledger entry
pub type EntryId = Uuid;

/// installment status, always derived by ledger replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentStatus {
    /// nothing paid, not yet overdue
    #[default]
    Pending,
    /// something paid, principal still outstanding, not overdue
    Partial,
    /// principal outstanding past the due date
    Late,
    /// principal fully settled
    Paid,
}

impl fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InstallmentStatus::Pending => "PENDING",
            InstallmentStatus::Partial => "PARTIAL",
            InstallmentStatus::Late => "LATE",
            InstallmentStatus::Paid => "PAID",
        };
        f.write_str(label)
    }
}

/// kind of financial event recorded in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryType {
    /// additional principal lent on top of an existing loan
    LendMore,
    PaymentFull,
    PaymentPartial,
    PaymentInterestOnly,
    /// payment made under a renegotiated agreement
    AgreementPayment,
    /// manual correction, may carry negative deltas
    Adjustment,
    /// new capital contribution
    NovoAporte,
    /// any tag this engine does not know; folded like an adjustment
    #[serde(untagged)]
    Other(String),
}

impl LedgerEntryType {
    /// payment events count as a renewal of the installment they target
    pub fn is_payment(&self) -> bool {
        matches!(
            self,
            LedgerEntryType::PaymentFull
                | LedgerEntryType::PaymentPartial
                | LedgerEntryType::PaymentInterestOnly
                | LedgerEntryType::AgreementPayment
        )
    }

    /// disbursement events raise the outstanding balance instead of paying it down
    pub fn is_disbursement(&self) -> bool {
        matches!(self, LedgerEntryType::LendMore | LedgerEntryType::NovoAporte)
    }
}
