//! Closing domain types.
//!
//! A closing is an invoiced batch of ledger entries. Its line items are
//! snapshots taken at closing time and never follow later edits to the
//! live entries.

use chrono::{DateTime, NaiveDate, Utc};
use itinera_shared::types::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::ledger::{EntryKind, EntryStatus, LogisticStatus};
use crate::reversal::ReversalRecord;

/// Who a closing settles with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosingType {
    /// Commissions owed to an in-house salesperson.
    Salesperson,
    /// Commissions owed to a partner agency.
    Agency,
    /// Payments owed to a tour operator.
    Operator,
}

impl ClosingType {
    /// Returns the string representation of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Salesperson => "salesperson",
            Self::Agency => "agency",
            Self::Operator => "operator",
        }
    }

    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "salesperson" | "seller" => Some(Self::Salesperson),
            "agency" => Some(Self::Agency),
            "operator" => Some(Self::Operator),
            _ => None,
        }
    }

    /// The ledger entry kind this closing type groups.
    #[must_use]
    pub const fn entry_kind(&self) -> EntryKind {
        match self {
            Self::Salesperson | Self::Agency => EntryKind::Commission,
            Self::Operator => EntryKind::OperatorPayment,
        }
    }

    /// The financial entry a closing of this type registers.
    #[must_use]
    pub const fn financial_kind(&self) -> FinancialEntryKind {
        match self {
            Self::Salesperson | Self::Agency => FinancialEntryKind::Receivable,
            Self::Operator => FinancialEntryKind::Payable,
        }
    }

    /// Invoice number prefix.
    #[must_use]
    pub const fn invoice_prefix(&self) -> &'static str {
        match self {
            Self::Salesperson => "SLS",
            Self::Agency => "AGC",
            Self::Operator => "OPR",
        }
    }
}

impl fmt::Display for ClosingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats a sequential invoice number for display, e.g. `OPR-000042`.
#[must_use]
pub fn format_invoice_number(closing_type: ClosingType, number: i64) -> String {
    format!("{}-{number:06}", closing_type.invoice_prefix())
}

/// Accounts payable or receivable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinancialEntryKind {
    /// Money the agency owes.
    Payable,
    /// Money owed to the agency.
    Receivable,
}

impl FinancialEntryKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Payable => "payable",
            Self::Receivable => "receivable",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "payable" | "accounts_payable" => Some(Self::Payable),
            "receivable" | "accounts_receivable" => Some(Self::Receivable),
            _ => None,
        }
    }
}

/// An invoiced batch of ledger entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Closing {
    /// Unique identifier.
    pub id: Uuid,
    /// Sequential number within the closing type.
    pub invoice_number: i64,
    /// Who the closing settles with.
    pub closing_type: ClosingType,
    /// Salesperson, agency or operator name printed on the invoice.
    pub recipient_name: String,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered.
    pub period_end: NaiveDate,
    /// The single currency of every line item.
    pub currency: Currency,
    /// Number of line items.
    pub item_count: i32,
    /// Exact sum of line item amounts.
    pub total_amount: Decimal,
    /// When the closing was created.
    pub created_at: DateTime<Utc>,
    /// User who created it.
    pub created_by: Uuid,
    /// Display name of that user.
    pub created_by_name: String,
    /// False once reversed.
    pub is_active: bool,
}

impl Closing {
    /// Display form of the invoice number.
    #[must_use]
    pub fn invoice_label(&self) -> String {
        format_invoice_number(self.closing_type, self.invoice_number)
    }
}

/// Snapshot of one ledger entry at closing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingLineItem {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning closing.
    pub closing_id: Uuid,
    /// Live ledger entry, for traceability only.
    pub entry_id: Uuid,
    /// Kind of the entry.
    pub kind: EntryKind,
    /// Originating reservation.
    pub reservation_id: Uuid,
    /// Reservation number.
    pub reservation_number: String,
    /// Tour name.
    pub tour_name: String,
    /// Client name.
    pub client_name: String,
    /// Passengers.
    pub pax: i32,
    /// Sale date.
    pub sale_date: NaiveDate,
    /// Operation date.
    pub operation_date: NaiveDate,
    /// Live amount of the entry when the closing was created.
    pub original_amount: Decimal,
    /// Amount invoiced; differs from `original_amount` when overridden.
    pub amount: Decimal,
    /// Entry status when the closing was created.
    pub status: EntryStatus,
    /// Logistic status when the closing was created.
    pub logistic_status: Option<LogisticStatus>,
}

impl ClosingLineItem {
    /// Returns true if an administrator replaced the amount at closing time.
    #[must_use]
    pub fn is_overridden(&self) -> bool {
        self.amount != self.original_amount
    }
}

/// Payable or receivable registered by a closing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialEntry {
    /// Unique identifier.
    pub id: Uuid,
    /// Closing that registered it.
    pub closing_id: Uuid,
    /// Payable or receivable.
    pub kind: FinancialEntryKind,
    /// Counterparty (the closing recipient).
    pub counterparty: String,
    /// Invoice number label.
    pub invoice_number: String,
    /// Human-readable description.
    pub description: String,
    /// Closing total.
    pub amount: Decimal,
    /// Closing currency.
    pub currency: Currency,
    /// Due date (end of the closing period).
    pub due_date: NaiveDate,
    /// When it was registered.
    pub created_at: DateTime<Utc>,
}

/// Input for closing a batch of entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseRequest {
    /// Entries to group, in display order.
    pub entry_ids: Vec<Uuid>,
    /// Who the closing settles with.
    pub closing_type: ClosingType,
    /// Recipient printed on the invoice.
    pub recipient_name: String,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered.
    pub period_end: NaiveDate,
    /// Currency every entry must be in.
    pub currency: Currency,
    /// Admin-only amount overrides keyed by entry id.
    #[serde(default)]
    pub overrides: BTreeMap<Uuid, Decimal>,
}

/// A closing with its line items and, if reversed, the reversal record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosingDetail {
    /// The closing.
    #[serde(flatten)]
    pub closing: Closing,
    /// Line item snapshots in selection order.
    pub items: Vec<ClosingLineItem>,
    /// Present when the closing was undone.
    pub reversal: Option<ReversalRecord>,
}

/// Everything a committed closing writes.
#[derive(Debug, Clone)]
pub struct ClosingDraft {
    /// Closing row.
    pub closing: Closing,
    /// Line item rows.
    pub items: Vec<ClosingLineItem>,
    /// Payable or receivable row.
    pub financial_entry: FinancialEntry,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ClosingType::Salesperson, 1, "SLS-000001")]
    #[case(ClosingType::Agency, 42, "AGC-000042")]
    #[case(ClosingType::Operator, 1_234_567, "OPR-1234567")]
    fn test_format_invoice_number(
        #[case] closing_type: ClosingType,
        #[case] number: i64,
        #[case] expected: &str,
    ) {
        assert_eq!(format_invoice_number(closing_type, number), expected);
    }

    #[test]
    fn test_type_mappings() {
        assert_eq!(ClosingType::Agency.entry_kind(), EntryKind::Commission);
        assert_eq!(ClosingType::Operator.entry_kind(), EntryKind::OperatorPayment);
        assert_eq!(ClosingType::Operator.financial_kind(), FinancialEntryKind::Payable);
        assert_eq!(ClosingType::Salesperson.financial_kind(), FinancialEntryKind::Receivable);
        assert_eq!(ClosingType::parse(" Operator "), Some(ClosingType::Operator));
    }
}
