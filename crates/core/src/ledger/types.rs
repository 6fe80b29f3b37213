//! Ledger domain types.
//!
//! A ledger entry is either a commission (expected income) or a payment owed
//! to a tour operator. Entries stay mutable while open and are frozen while
//! they belong to an active closing.

use chrono::{DateTime, NaiveDate, Utc};
use itinera_shared::types::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What a ledger entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Commission on a sale, owed to a salesperson or agency.
    Commission,
    /// Cost owed to the operator running the tour.
    OperatorPayment,
}

impl EntryKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Commission => "commission",
            Self::OperatorPayment => "operator_payment",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "commission" => Some(Self::Commission),
            "operator_payment" | "operator" => Some(Self::OperatorPayment),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status of an entry while it is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Recorded, not yet reviewed.
    Pending,
    /// Reviewed and accepted.
    Approved,
    /// Settled outside the closing flow.
    Paid,
    /// Voided; excluded from forecasts.
    Cancelled,
}

impl EntryStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "paid" => Some(Self::Paid),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operational state of the tour behind an operator payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogisticStatus {
    /// Not yet confirmed with the operator.
    Pending,
    /// Confirmed, not yet run.
    Confirmed,
    /// Running.
    InProgress,
    /// Ran to completion.
    Completed,
    /// The client did not show up.
    NoShow,
    /// Cancelled.
    Cancelled,
}

impl LogisticStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::NoShow => "no_show",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "no_show" => Some(Self::NoShow),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true once the tour has concluded one way or another.
    #[must_use]
    pub const fn is_concluded(&self) -> bool {
        matches!(self, Self::Completed | Self::NoShow | Self::Cancelled)
    }
}

impl fmt::Display for LogisticStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A commission or operator payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier.
    pub id: Uuid,
    /// Commission or operator payment.
    pub kind: EntryKind,
    /// Salesperson, agency, or operator display name.
    pub subject_name: String,
    /// Originating reservation (read-only foreign key).
    pub reservation_id: Uuid,
    /// Human-readable reservation number.
    pub reservation_number: String,
    /// Tour sold.
    pub tour_name: String,
    /// Client who booked.
    pub client_name: String,
    /// Number of passengers.
    pub pax: i32,
    /// Date the reservation was sold.
    pub sale_date: NaiveDate,
    /// Date the tour runs.
    pub operation_date: NaiveDate,
    /// Sale amount the entry derives from.
    pub gross_amount: Decimal,
    /// Currency of every amount on the entry.
    pub currency: Currency,
    /// Commission percentage (commissions only).
    pub rate: Option<Decimal>,
    /// Commission amount (commissions only).
    pub computed_amount: Option<Decimal>,
    /// Amount owed to the operator (operator payments only).
    pub cost_amount: Option<Decimal>,
    /// Payment status.
    pub status: EntryStatus,
    /// Tour state (operator payments only).
    pub logistic_status: Option<LogisticStatus>,
    /// Active closing this entry belongs to, if any.
    pub closing_id: Option<Uuid>,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
    /// When the entry last changed.
    pub updated_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// The live amount: computed commission, or operator cost.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        match self.kind {
            EntryKind::Commission => self.computed_amount,
            EntryKind::OperatorPayment => self.cost_amount,
        }
        .unwrap_or(Decimal::ZERO)
    }

    /// Replaces the live amount field matching this entry's kind.
    pub fn set_amount(&mut self, amount: Decimal) {
        match self.kind {
            EntryKind::Commission => self.computed_amount = Some(amount),
            EntryKind::OperatorPayment => self.cost_amount = Some(amount),
        }
    }

    /// Returns true while the entry is not sealed in an active closing.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.closing_id.is_none()
    }

    /// Whether the entry may be included in a closing.
    ///
    /// Operator payments wait until their tour concluded; commissions are
    /// always eligible.
    #[must_use]
    pub fn can_close(&self) -> bool {
        match self.kind {
            EntryKind::Commission => true,
            EntryKind::OperatorPayment => self
                .logistic_status
                .is_some_and(|status| status.is_concluded()),
        }
    }
}

/// Input for recording a new ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLedgerEntry {
    /// Commission or operator payment.
    pub kind: EntryKind,
    /// Salesperson, agency, or operator display name.
    pub subject_name: String,
    /// Originating reservation.
    pub reservation_id: Uuid,
    /// Human-readable reservation number.
    pub reservation_number: String,
    /// Tour sold.
    pub tour_name: String,
    /// Client who booked.
    pub client_name: String,
    /// Number of passengers.
    pub pax: i32,
    /// Sale date.
    pub sale_date: NaiveDate,
    /// Operation date.
    pub operation_date: NaiveDate,
    /// Sale amount.
    pub gross_amount: Decimal,
    /// Currency.
    pub currency: Currency,
    /// Commission percentage (commissions).
    pub rate: Option<Decimal>,
    /// Explicit commission amount; derived from `rate` when absent.
    pub computed_amount: Option<Decimal>,
    /// Operator cost (operator payments).
    pub cost_amount: Option<Decimal>,
    /// Tour state (operator payments).
    pub logistic_status: Option<LogisticStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn operator_entry(logistic_status: Option<LogisticStatus>) -> LedgerEntry {
        LedgerEntry {
            id: Uuid::new_v4(),
            kind: EntryKind::OperatorPayment,
            subject_name: "Patagonia Trek".to_string(),
            reservation_id: Uuid::new_v4(),
            reservation_number: "R-1001".to_string(),
            tour_name: "Torres del Paine".to_string(),
            client_name: "J. Smith".to_string(),
            pax: 2,
            sale_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            operation_date: NaiveDate::from_ymd_opt(2026, 3, 20).unwrap(),
            gross_amount: dec!(900),
            currency: Currency::Usd,
            rate: None,
            computed_amount: None,
            cost_amount: Some(dec!(600)),
            status: EntryStatus::Pending,
            logistic_status,
            closing_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_can_close_gated_by_logistic_status() {
        assert!(operator_entry(Some(LogisticStatus::Completed)).can_close());
        assert!(operator_entry(Some(LogisticStatus::NoShow)).can_close());
        assert!(operator_entry(Some(LogisticStatus::Cancelled)).can_close());
        assert!(!operator_entry(Some(LogisticStatus::Pending)).can_close());
        assert!(!operator_entry(Some(LogisticStatus::Confirmed)).can_close());
        assert!(!operator_entry(Some(LogisticStatus::InProgress)).can_close());
        assert!(!operator_entry(None).can_close());
    }

    #[test]
    fn test_amount_follows_kind() {
        let mut entry = operator_entry(None);
        assert_eq!(entry.amount(), dec!(600));

        entry.set_amount(dec!(550));
        assert_eq!(entry.cost_amount, Some(dec!(550)));
        assert_eq!(entry.computed_amount, None);
    }

    #[test]
    fn test_open_derived_from_closing() {
        let mut entry = operator_entry(None);
        assert!(entry.is_open());
        entry.closing_id = Some(Uuid::new_v4());
        assert!(!entry.is_open());
    }

    #[test]
    fn test_parse_round_trips() {
        for status in [
            LogisticStatus::Pending,
            LogisticStatus::Confirmed,
            LogisticStatus::InProgress,
            LogisticStatus::Completed,
            LogisticStatus::NoShow,
            LogisticStatus::Cancelled,
        ] {
            assert_eq!(LogisticStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(LogisticStatus::parse("No-Show"), Some(LogisticStatus::NoShow));
        assert_eq!(EntryStatus::parse("Canceled"), Some(EntryStatus::Cancelled));
        assert_eq!(EntryKind::parse("operator"), Some(EntryKind::OperatorPayment));
    }
}
