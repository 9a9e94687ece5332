/// quick start - originate a loan, take a payment, print the read model
use chrono::{NaiveDate, TimeZone, Utc};
use loan_ledger_rs::{originate, LoanEngine, LoanTerms, LoanView, Money, PaymentOptions, Policy, Rate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).ok_or("bad date")?;

    // 1,000 over 3 months at 10% a month, 2% fine, 1% a day when late
    let policy = Policy::new(Rate::from_percentage(10), Rate::from_percentage(2), Rate::from_percentage(1));
    let terms = LoanTerms::new(Money::from_major(1_000), policy, start).with_installments(3);
    let loan = originate(&terms, "MONTHLY")?;

    // pay the first installment in full on its due date
    let engine = LoanEngine::default();
    let first = loan.installments[0].id;
    let due = engine.quote(&loan, first, loan.installments[0].due_date)?;
    let paid_at = Utc.with_ymd_and_hms(2024, 2, 2, 10, 0, 0).unwrap();
    let outcome = engine.pay(&loan, first, due.total, PaymentOptions::default(), paid_at)?;

    let today = NaiveDate::from_ymd_opt(2024, 2, 2).ok_or("bad date")?;
    println!("{}", LoanView::build(&outcome.loan, today)?.to_json_pretty()?);

    Ok(())
}
