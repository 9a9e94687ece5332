//! Stateless facade: resolve a stored tag and forward to the modality.

use chrono::NaiveDate;

use crate::config::{EngineConfig, Policy};
use crate::errors::Result;
use crate::loan::Installment;

use super::{CalculationResult, ModalityRegistry, RenewalRequest, RenewalResult};

pub fn calculate(
    billing_cycle: &str,
    installment: &Installment,
    policy: &Policy,
    today: NaiveDate,
    config: &EngineConfig,
) -> CalculationResult {
    ModalityRegistry::standard()
        .get(billing_cycle)
        .calculate(installment, policy, today, config)
}

pub fn renew(
    billing_cycle: &str,
    installment: &Installment,
    policy: &Policy,
    request: &RenewalRequest,
    config: &EngineConfig,
) -> Result<RenewalResult> {
    ModalityRegistry::standard()
        .get(billing_cycle)
        .renew(installment, policy, request, config)
}
