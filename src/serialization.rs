//! Serializable read model of a replayed loan.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculator::{self, DebtCalculator};
use crate::decimal::{Money, Rate};
use crate::loan::{Installment, Loan};
use crate::modality::{CalculationResult, ModalityResolution};
use crate::replay::{self, ReplayWarning};
use crate::types::{InstallmentId, InstallmentStatus, LoanId};

/// what a collaborator renders for one loan
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    pub id: LoanId,
    pub billing_cycle: String,
    pub modality: ModalityResolution,
    pub as_of: NaiveDate,
    pub is_archived: bool,
    pub terms: TermsView,
    pub totals: TotalsView,
    pub installments: Vec<InstallmentView>,
    pub warnings: Vec<ReplayWarning>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermsView {
    pub principal: Money,
    pub interest_rate: Rate,
    pub fine_percent: Rate,
    pub daily_interest_percent: Rate,
    pub total_to_receive: Money,
    /// rates came from the frozen snapshot rather than the live fields
    pub policy_frozen: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsView {
    pub principal_remaining: Money,
    pub interest_remaining: Money,
    pub late_fees: Money,
    pub total_due: Money,
    pub total_paid: Money,
    pub is_settled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentView {
    pub id: InstallmentId,
    pub number: u32,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: Money,
    pub principal_remaining: Money,
    pub interest_remaining: Money,
    pub late_fee_accrued: Money,
    pub paid_principal: Money,
    pub paid_interest: Money,
    pub paid_late_fee: Money,
    pub paid_total: Money,
    pub status: InstallmentStatus,
    pub renewal_count: u32,
    pub paid_date: Option<NaiveDate>,
    pub debt: CalculationResult,
    pub logs: Vec<String>,
}

impl InstallmentView {
    fn from_installment(installment: &Installment, debt: CalculationResult) -> Self {
        InstallmentView {
            id: installment.id,
            number: installment.number,
            start_date: installment.start_date,
            due_date: installment.due_date,
            amount: installment.amount,
            principal_remaining: installment.principal_remaining(),
            interest_remaining: installment.interest_remaining(),
            late_fee_accrued: debt.late_fee,
            paid_principal: installment.paid_principal(),
            paid_interest: installment.paid_interest(),
            paid_late_fee: installment.paid_late_fee(),
            paid_total: installment.paid_total(),
            status: installment.status(),
            renewal_count: installment.renewal_count(),
            paid_date: installment.paid_date(),
            debt,
            logs: installment.logs().to_vec(),
        }
    }
}

impl LoanView {
    /// replay `loan` and price every installment as of `today`
    pub fn build(loan: &Loan, today: NaiveDate) -> crate::errors::Result<Self> {
        Self::build_with(&DebtCalculator::default(), loan, today)
    }

    pub fn build_with(calculator: &DebtCalculator, loan: &Loan, today: NaiveDate) -> crate::errors::Result<Self> {
        let outcome = replay::rebuild_loan_state_from_ledger(loan, today);
        let replayed = &outcome.loan;
        let policy = calculator::resolve_policy(replayed);

        let installments = replayed
            .installments
            .iter()
            .map(|installment| {
                let debt = calculator.calculate_total_due(replayed, installment, today)?;
                Ok(InstallmentView::from_installment(installment, debt))
            })
            .collect::<crate::errors::Result<Vec<_>>>()?;

        let total_due: Money = installments.iter().map(|i| i.debt.total).sum();
        let totals = TotalsView {
            principal_remaining: installments.iter().map(|i| i.principal_remaining).sum(),
            interest_remaining: installments.iter().map(|i| i.interest_remaining).sum(),
            late_fees: installments.iter().map(|i| i.late_fee_accrued).sum(),
            total_due,
            total_paid: installments.iter().map(|i| i.paid_total).sum(),
            is_settled: calculator.config().is_effectively_zero(total_due),
        };

        Ok(LoanView {
            id: replayed.id,
            billing_cycle: replayed.billing_cycle.clone(),
            modality: calculator::modality_for(replayed),
            as_of: today,
            is_archived: replayed.is_archived,
            terms: TermsView {
                principal: replayed.principal,
                interest_rate: policy.interest_rate,
                fine_percent: policy.fine_percent,
                daily_interest_percent: policy.daily_interest_percent,
                total_to_receive: replayed.total_to_receive,
                policy_frozen: replayed.policies_snapshot.is_some(),
            },
            totals,
            installments,
            warnings: outcome.warnings,
        })
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
