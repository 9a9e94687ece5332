use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{EntryId, InstallmentId, LedgerEntryType};

/// immutable financial event recorded against a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: EntryId,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub entry_type: LedgerEntryType,
    /// cash that moved
    pub amount: Money,
    #[serde(default)]
    pub principal_delta: Money,
    #[serde(default)]
    pub interest_delta: Money,
    #[serde(default)]
    pub late_fee_delta: Money,
    /// loan-level events carry no installment
    #[serde(default)]
    pub installment_id: Option<InstallmentId>,
    #[serde(default)]
    pub notes: String,
}

impl LedgerEntry {
    pub fn new(entry_type: LedgerEntryType, date: DateTime<Utc>, amount: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            entry_type,
            amount,
            principal_delta: Money::ZERO,
            interest_delta: Money::ZERO,
            late_fee_delta: Money::ZERO,
            installment_id: None,
            notes: String::new(),
        }
    }

    pub fn with_id(mut self, id: EntryId) -> Self {
        self.id = id;
        self
    }

    pub fn for_installment(mut self, installment_id: InstallmentId) -> Self {
        self.installment_id = Some(installment_id);
        self
    }

    pub fn with_deltas(mut self, principal: Money, interest: Money, late_fee: Money) -> Self {
        self.principal_delta = principal;
        self.interest_delta = interest;
        self.late_fee_delta = late_fee;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// payment against one installment
    pub fn payment(
        entry_type: LedgerEntryType,
        installment_id: InstallmentId,
        date: DateTime<Utc>,
        amount: Money,
        principal: Money,
        interest: Money,
        late_fee: Money,
    ) -> Self {
        Self::new(entry_type, date, amount)
            .for_installment(installment_id)
            .with_deltas(principal, interest, late_fee)
    }

    /// extra principal lent against an installment
    pub fn disbursement(installment_id: InstallmentId, date: DateTime<Utc>, amount: Money) -> Self {
        Self::new(LedgerEntryType::LendMore, date, amount)
            .for_installment(installment_id)
            .with_deltas(amount, Money::ZERO, Money::ZERO)
    }
}

/// append-only event log of a loan
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }

    pub fn append(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    /// entries in insertion order
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn for_installment(&self, installment_id: InstallmentId) -> impl Iterator<Item = &LedgerEntry> {
        self.entries
            .iter()
            .filter(move |e| e.installment_id == Some(installment_id))
    }

    /// entries ordered by date; same-instant entries keep insertion order
    pub fn chronological(&self) -> Vec<&LedgerEntry> {
        let mut sorted: Vec<&LedgerEntry> = self.entries.iter().collect();
        sorted.sort_by_key(|e| e.date);
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_chronological_is_stable() {
        let installment = Uuid::new_v4();
        let early = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 2, 10, 12, 0, 0).unwrap();

        let mut ledger = Ledger::new();
        ledger.append(LedgerEntry::new(LedgerEntryType::Adjustment, late, Money::ONE).with_notes("c"));
        ledger.append(LedgerEntry::new(LedgerEntryType::Adjustment, early, Money::ONE).with_notes("a"));
        ledger.append(
            LedgerEntry::disbursement(installment, early, Money::from_major(50)).with_notes("b"),
        );

        let notes: Vec<&str> = ledger.chronological().iter().map(|e| e.notes.as_str()).collect();
        assert_eq!(notes, vec!["a", "b", "c"]);

        // insertion order is untouched
        assert_eq!(ledger.entries()[0].notes, "c");
        assert_eq!(ledger.for_installment(installment).count(), 1);
    }

    #[test]
    fn test_entry_json_shape() {
        let installment = Uuid::new_v4();
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let entry = LedgerEntry::payment(
            LedgerEntryType::PaymentPartial,
            installment,
            date,
            Money::from_major(60),
            Money::from_major(50),
            Money::from_major(10),
            Money::ZERO,
        );

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "PAYMENT_PARTIAL");
        assert_eq!(json["installmentId"], installment.to_string());

        let back: LedgerEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_minimal_entry_deserializes() {
        let json = r#"{
            "id": "7f1b7c1e-3c1a-4b5e-9a57-8d2f1d1c0a11",
            "date": "2024-03-01T10:00:00Z",
            "type": "NOVO_APORTE",
            "amount": "250.00"
        }"#;
        let entry: LedgerEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.entry_type, LedgerEntryType::NovoAporte);
        assert_eq!(entry.installment_id, None);
        assert_eq!(entry.principal_delta, Money::ZERO);
        assert!(entry.notes.is_empty());
    }
}
