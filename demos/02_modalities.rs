/// modalities - the same payment under each billing rule-set
use chrono::{NaiveDate, TimeZone, Utc};
use loan_ledger_rs::{
    build_installments, LoanEngine, LoanTerms, Loan, Modality, ModalityRegistry, Money,
    PaymentOptions, Policy, Rate,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== billing modalities ===\n");

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;
    let policy = Policy::new(Rate::from_percentage(30), Rate::from_percentage(2), Rate::from_percentage(1));
    let terms = LoanTerms::new(Money::from_major(500), policy, start).with_term_days(30);
    let engine = LoanEngine::default();
    let paid_at = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();

    for modality in Modality::ALL {
        let installments = build_installments(&terms, modality)?;
        let loan = Loan::new(terms.principal, policy, modality.tag(), start, installments);
        let id = loan.installments[0].id;

        let outcome = engine.pay(&loan, id, Money::from_major(150), PaymentOptions::default(), paid_at)?;
        let inst = &outcome.loan.installments[0];
        println!(
            "{:<16} owed {:>8}  paid 150.00  -> due {}  principal {:>8}  interest {:>8}  {}",
            modality.tag(),
            outcome.debt.total,
            inst.due_date,
            inst.principal_remaining(),
            inst.interest_remaining(),
            inst.status()
        );
    }

    // stored tags from older records keep resolving
    println!("\n=== legacy tags ===\n");
    let registry = ModalityRegistry::standard();
    for tag in ["DAILY", "WEEKLY", "DAILY_FIXED", "mensal", "SOMETHING_NEW"] {
        println!("{:<14} -> {:?}", tag, registry.resolve(tag));
    }

    Ok(())
}
