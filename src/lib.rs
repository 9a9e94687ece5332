pub mod calculator;
pub mod calendar;
pub mod config;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod ledger;
pub mod loan;
pub mod modality;
pub mod payments;
pub mod replay;
pub mod schedule;
pub mod serialization;
pub mod types;

// re-export key types
pub use calculator::{calculate_total_due, resolve_policy, DebtCalculator};
pub use config::{EngineConfig, Policy};
pub use decimal::{Money, Rate};
pub use engine::{LoanEngine, PaymentOptions, PaymentOutcome};
pub use errors::{LedgerError, Result};
pub use ledger::{Ledger, LedgerEntry};
pub use loan::{Installment, Loan};
pub use modality::{
    CalculationResult, Modality, ModalityRegistry, ModalityResolution, RenewalRequest,
    RenewalResult,
};
pub use payments::{allocate_payment, PaymentAllocation};
pub use replay::{rebuild_loan_state_from_ledger, ReplayOutcome, ReplayWarning};
pub use schedule::{build_installments, originate, LoanTerms};
pub use serialization::LoanView;
pub use types::{EntryId, InstallmentId, InstallmentStatus, LedgerEntryType, LoanId};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
