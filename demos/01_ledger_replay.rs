/// ledger replay - installment state is always rebuilt from the ledger
use chrono::{Duration, TimeZone, Utc};
use loan_ledger_rs::{
    calendar, rebuild_loan_state_from_ledger, Installment, LedgerEntry, LedgerEntryType, Loan,
    LoanEngine, Money, PaymentOptions, Policy, Rate, SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== ledger replay ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();

    let start = calendar::today(&time);
    let due = calendar::add_calendar_months(start, 1)?;
    let policy = Policy::new(Rate::from_percentage(10), Rate::from_percentage(2), Rate::from_percentage(1));
    let installment = Installment::new(1, start, due, Money::from_major(100), Money::from_major(10));
    let loan = Loan::new(Money::from_major(100), policy, "MONTHLY", start, vec![installment]).with_frozen_policy();
    let id = loan.installments[0].id;

    let engine = LoanEngine::default();

    // five days late
    controller.advance(Duration::days(35));
    let quote = engine.quote_now(&loan, id, &time)?;
    println!("owed after {} days late: {} (late fee {})", quote.days_late, quote.total, quote.late_fee);

    // interest and fee only, the installment rolls forward
    let outcome = engine.pay_now(&loan, id, quote.late_fee + quote.interest, PaymentOptions::default(), &time)?;
    let inst = &outcome.loan.installments[0];
    println!(
        "{:?}: due {} -> {}, status {}, remaining {}",
        outcome.entry.entry_type,
        due,
        inst.due_date,
        inst.status(),
        inst.outstanding()
    );

    // replay is idempotent
    let today = calendar::today(&time);
    let again = rebuild_loan_state_from_ledger(&outcome.loan, today);
    println!("replay stable: {}", again.loan == outcome.loan);

    // an entry for an installment the loan does not have is skipped, not fatal
    let mut damaged = outcome.loan.clone();
    damaged.record(LedgerEntry::payment(
        LedgerEntryType::PaymentFull,
        Uuid::new_v4(),
        time.now(),
        Money::from_major(999),
        Money::from_major(999),
        Money::ZERO,
        Money::ZERO,
    ));
    let replayed = rebuild_loan_state_from_ledger(&damaged, today);
    println!("warnings: {:?}", replayed.warnings);
    println!("remaining unchanged: {}", replayed.loan.installments[0].outstanding());

    Ok(())
}
