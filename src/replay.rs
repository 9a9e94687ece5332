//! Ledger replay.
//!
//! Installment state is a fold of the ledger over the pristine schedule. Nothing else writes
//! balances, paid accumulators or status, and the fold never reads them as input, so replaying
//! a replayed loan changes nothing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::calendar;
use crate::decimal::Money;
use crate::ledger::LedgerEntry;
use crate::loan::{Installment, Loan};
use crate::types::{EntryId, InstallmentId, InstallmentStatus, LedgerEntryType};

/// ledger entry that could not be folded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReplayWarning {
    /// entry references an installment the loan does not have
    UnknownInstallment {
        entry_id: EntryId,
        installment_id: InstallmentId,
    },
}

/// replayed loan plus anything skipped on the way
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    pub loan: Loan,
    pub warnings: Vec<ReplayWarning>,
}

impl ReplayOutcome {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// rebuild every installment of `loan` from its schedule and ledger
///
/// `today` only decides whether an unpaid installment is LATE.
pub fn rebuild_loan_state_from_ledger(loan: &Loan, today: NaiveDate) -> ReplayOutcome {
    let mut installments: Vec<Installment> = loan.installments.iter().map(Installment::pristine).collect();
    let index: HashMap<InstallmentId, usize> = installments
        .iter()
        .enumerate()
        .map(|(position, installment)| (installment.id, position))
        .collect();

    let mut warnings = Vec::new();
    let mut last_entry_day: HashMap<InstallmentId, NaiveDate> = HashMap::new();

    for entry in loan.ledger.chronological() {
        let Some(installment_id) = entry.installment_id else {
            continue;
        };
        let Some(&position) = index.get(&installment_id) else {
            log::warn!(
                "skipping ledger entry {} on loan {}: unknown installment {}",
                entry.id,
                loan.id,
                installment_id
            );
            warnings.push(ReplayWarning::UnknownInstallment {
                entry_id: entry.id,
                installment_id,
            });
            continue;
        };

        fold_entry(&mut installments[position], entry);
        last_entry_day.insert(installment_id, calendar::entry_day(entry.date));
    }

    for installment in installments.iter_mut() {
        installment.status = settle_status(installment, today);
        if installment.status == InstallmentStatus::Paid {
            installment.paid_date = last_entry_day.get(&installment.id).copied();
        }
    }

    let mut replayed = loan.clone();
    replayed.installments = installments;
    ReplayOutcome {
        loan: replayed,
        warnings,
    }
}

/// replayed loan without the warnings
pub fn replay(loan: &Loan, today: NaiveDate) -> Loan {
    rebuild_loan_state_from_ledger(loan, today).loan
}

/// fold one entry into its installment
///
/// Payment-type and unrecognized entries add their deltas to the paid accumulators and take
/// them off the balances. Two kinds depart from that uniform fold: disbursements
/// (`LEND_MORE`, `NOVO_APORTE`) raise the balances and count as nothing paid, and
/// `ADJUSTMENT` moves the balances without touching the paid accumulators since no cash
/// changed hands.
fn fold_entry(installment: &mut Installment, entry: &LedgerEntry) {
    let entry_type = &entry.entry_type;

    if entry_type.is_disbursement() {
        // new money lent against the installment raises what is owed
        installment.principal_remaining += entry.principal_delta;
        installment.interest_remaining += entry.interest_delta;
    } else {
        if *entry_type != LedgerEntryType::Adjustment {
            installment.paid_principal += entry.principal_delta;
            installment.paid_interest += entry.interest_delta;
            installment.paid_late_fee += entry.late_fee_delta;
            installment.paid_total += entry.amount;
            if calendar::entry_day(entry.date) > installment.due_date {
                installment.paid_late_fee_since_due += entry.late_fee_delta;
            }
        }

        installment.principal_remaining = (installment.principal_remaining - entry.principal_delta).non_negative();
        installment.interest_remaining = (installment.interest_remaining - entry.interest_delta).non_negative();
    }

    if entry_type.is_payment() {
        installment.renewal_count += 1;
    }
    if !entry.notes.is_empty() {
        installment.logs.push(entry.notes.clone());
    }
}

fn settle_status(installment: &Installment, today: NaiveDate) -> InstallmentStatus {
    if installment.principal_remaining <= Money::ZERO {
        InstallmentStatus::Paid
    } else if installment.is_overdue(today) {
        InstallmentStatus::Late
    } else if installment.paid_total.is_positive() {
        InstallmentStatus::Partial
    } else {
        InstallmentStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Policy;
    use crate::decimal::Rate;
    use crate::modality::test_support::d;
    use crate::modality::RenewalResult;
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    fn at(y: i32, m: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, day, 12, 0, 0).unwrap()
    }

    fn loan() -> Loan {
        let policy = Policy::new(Rate::from_percentage(10), Rate::from_percentage(2), Rate::from_percentage(1));
        let installment = Installment::new(1, d(2024, 1, 1), d(2024, 1, 31), Money::from_major(100), Money::from_major(10));
        Loan::new(Money::from_major(100), policy, "MONTHLY", d(2024, 1, 1), vec![installment])
    }

    fn pay(loan: &mut Loan, on: DateTime<Utc>, principal: i64, interest: i64) {
        let id = loan.installments[0].id;
        let amount = Money::from_major(principal + interest);
        loan.record(LedgerEntry::payment(
            LedgerEntryType::PaymentPartial,
            id,
            on,
            amount,
            Money::from_major(principal),
            Money::from_major(interest),
            Money::ZERO,
        ));
    }

    #[test]
    fn test_empty_ledger_is_pristine() {
        let loan = loan();
        let outcome = rebuild_loan_state_from_ledger(&loan, d(2024, 1, 10));
        assert!(outcome.is_clean());
        assert_eq!(outcome.loan.installments[0], loan.installments[0].pristine());
    }

    #[test]
    fn test_partial_payment_fold() {
        let mut loan = loan();
        pay(&mut loan, at(2024, 1, 10), 40, 10);

        let inst = &replay(&loan, d(2024, 1, 15)).installments[0];
        assert_eq!(inst.principal_remaining(), Money::from_major(60));
        assert_eq!(inst.interest_remaining(), Money::ZERO);
        assert_eq!(inst.paid_principal(), Money::from_major(40));
        assert_eq!(inst.paid_interest(), Money::from_major(10));
        assert_eq!(inst.paid_total(), Money::from_major(50));
        assert_eq!(inst.renewal_count(), 1);
        assert_eq!(inst.status(), InstallmentStatus::Partial);
    }

    #[test]
    fn test_overdue_partial_is_late() {
        let mut loan = loan();
        pay(&mut loan, at(2024, 1, 10), 40, 10);

        // five days past the due date with principal still open
        let inst = &replay(&loan, d(2024, 2, 5)).installments[0];
        assert_eq!(inst.status(), InstallmentStatus::Late);
    }

    #[test]
    fn test_full_payment_sets_paid_date() {
        let mut loan = loan();
        pay(&mut loan, at(2024, 1, 10), 30, 10);
        pay(&mut loan, at(2024, 1, 20), 70, 0);

        let inst = &replay(&loan, d(2024, 3, 1)).installments[0];
        assert_eq!(inst.status(), InstallmentStatus::Paid);
        assert_eq!(inst.paid_date(), Some(d(2024, 1, 20)));
        assert_eq!(inst.principal_remaining(), Money::ZERO);
    }

    #[test]
    fn test_replay_is_idempotent() {
        let mut loan = loan();
        pay(&mut loan, at(2024, 1, 20), 70, 0);
        pay(&mut loan, at(2024, 1, 10), 30, 10);

        let today = d(2024, 2, 15);
        let once = replay(&loan, today);
        let twice = replay(&once, today);
        assert_eq!(once, twice);
        assert_eq!(
            serde_json::to_string(&once).unwrap(),
            serde_json::to_string(&twice).unwrap()
        );
    }

    #[test]
    fn test_stale_derived_fields_are_ignored() {
        let mut loan = loan();
        pay(&mut loan, at(2024, 1, 10), 40, 10);
        loan.installments[0].principal_remaining = Money::from_major(1);
        loan.installments[0].status = InstallmentStatus::Paid;

        let inst = &replay(&loan, d(2024, 1, 15)).installments[0];
        assert_eq!(inst.principal_remaining(), Money::from_major(60));
        assert_eq!(inst.status(), InstallmentStatus::Partial);
    }

    #[test]
    fn test_overpaid_deltas_clamp_at_zero() {
        let mut loan = loan();
        pay(&mut loan, at(2024, 1, 10), 150, 25);

        let inst = &replay(&loan, d(2024, 1, 15)).installments[0];
        assert_eq!(inst.principal_remaining(), Money::ZERO);
        assert_eq!(inst.interest_remaining(), Money::ZERO);
        assert_eq!(inst.paid_total(), Money::from_major(175));
    }

    #[test]
    fn test_entries_fold_in_date_order() {
        let mut loan = loan();
        let id = loan.installments[0].id;
        loan.record(
            LedgerEntry::payment(LedgerEntryType::PaymentPartial, id, at(2024, 1, 20), Money::from_major(5), Money::from_major(5), Money::ZERO, Money::ZERO)
                .with_notes("second"),
        );
        loan.record(
            LedgerEntry::payment(LedgerEntryType::PaymentPartial, id, at(2024, 1, 5), Money::from_major(5), Money::from_major(5), Money::ZERO, Money::ZERO)
                .with_notes("first"),
        );

        let inst = &replay(&loan, d(2024, 1, 25)).installments[0];
        assert_eq!(inst.logs(), &["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_unknown_installment_is_skipped_with_warning() {
        let mut loan = loan();
        pay(&mut loan, at(2024, 1, 10), 40, 10);
        let stray = LedgerEntry::payment(
            LedgerEntryType::PaymentFull,
            Uuid::new_v4(),
            at(2024, 1, 11),
            Money::from_major(500),
            Money::from_major(500),
            Money::ZERO,
            Money::ZERO,
        );
        let stray_id = stray.id;
        let stray_installment = stray.installment_id.unwrap();
        loan.record(stray);

        let outcome = rebuild_loan_state_from_ledger(&loan, d(2024, 1, 15));
        assert_eq!(
            outcome.warnings,
            vec![ReplayWarning::UnknownInstallment {
                entry_id: stray_id,
                installment_id: stray_installment
            }]
        );
        assert_eq!(outcome.loan.installments[0].principal_remaining(), Money::from_major(60));
    }

    #[test]
    fn test_disbursement_raises_balance() {
        let mut loan = loan();
        let id = loan.installments[0].id;
        loan.record(LedgerEntry::disbursement(id, at(2024, 1, 5), Money::from_major(50)));

        let inst = &replay(&loan, d(2024, 1, 15)).installments[0];
        assert_eq!(inst.principal_remaining(), Money::from_major(150));
        assert_eq!(inst.paid_total(), Money::ZERO);
        assert_eq!(inst.renewal_count(), 0);
        assert_eq!(inst.status(), InstallmentStatus::Pending);
    }

    #[test]
    fn test_adjustment_moves_balance_without_cash() {
        let mut loan = loan();
        pay(&mut loan, at(2024, 1, 10), 40, 10);
        let id = loan.installments[0].id;
        loan.record(
            LedgerEntry::new(LedgerEntryType::Adjustment, at(2024, 1, 10), Money::ZERO)
                .for_installment(id)
                .with_deltas(Money::from_major(60), Money::ZERO, Money::ZERO),
        );

        let inst = &replay(&loan, d(2024, 1, 15)).installments[0];
        assert_eq!(inst.principal_remaining(), Money::ZERO);
        assert_eq!(inst.paid_principal(), Money::from_major(40));
        assert_eq!(inst.paid_total(), Money::from_major(50));
        assert_eq!(inst.renewal_count(), 1);
        assert_eq!(inst.status(), InstallmentStatus::Paid);
    }

    #[test]
    fn test_late_fees_paid_after_due_are_tracked() {
        let mut loan = loan();
        let id = loan.installments[0].id;
        // due 2024-01-31; a fee paid on the due date itself is not late
        loan.record(LedgerEntry::payment(LedgerEntryType::PaymentPartial, id, at(2024, 1, 31), Money::from_major(2), Money::ZERO, Money::ZERO, Money::from_major(2)));
        loan.record(LedgerEntry::payment(LedgerEntryType::PaymentPartial, id, at(2024, 2, 3), Money::from_major(3), Money::ZERO, Money::ZERO, Money::from_major(3)));

        let inst = &replay(&loan, d(2024, 2, 5)).installments[0];
        assert_eq!(inst.paid_late_fee(), Money::from_major(5));
        assert_eq!(inst.paid_late_fee_since_due(), Money::from_major(3));
    }

    #[test]
    fn test_loan_level_entries_are_ignored() {
        let mut loan = loan();
        loan.record(LedgerEntry::new(LedgerEntryType::Adjustment, at(2024, 1, 5), Money::from_major(10)));

        let outcome = rebuild_loan_state_from_ledger(&loan, d(2024, 1, 15));
        assert!(outcome.is_clean());
        assert_eq!(outcome.loan.installments[0], loan.installments[0].pristine());
    }

    #[test]
    fn test_rebased_schedule_replays_to_renewed_balances() {
        let mut loan = loan();
        let today = d(2024, 1, 31);
        let inst = replay(&loan, today).installments[0].clone();

        // interest-only payment rolls the installment one cycle with fresh interest
        let renewal = RenewalResult::rebased(
            &inst,
            d(2024, 1, 31),
            d(2024, 3, 1),
            Money::from_major(100),
            Money::from_major(10),
            Money::ZERO,
            Money::from_major(10),
        );
        pay(&mut loan, at(2024, 1, 31), 0, 10);
        assert!(loan.reschedule(inst.id, &renewal));

        let renewed = &replay(&loan, today).installments[0];
        assert_eq!(renewed.principal_remaining(), Money::from_major(100));
        assert_eq!(renewed.interest_remaining(), Money::from_major(10));
        assert_eq!(renewed.due_date, d(2024, 3, 1));
        assert_eq!(renewed.renewal_count(), 1);
        assert_eq!(renewed.status(), InstallmentStatus::Partial);
    }
}
