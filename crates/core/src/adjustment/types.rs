//! Adjustment domain types.

use chrono::{DateTime, Utc};
use itinera_shared::types::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::ledger::EntryKind;

/// Direction of a proposed amount change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentType {
    /// The new amount is higher.
    Increase,
    /// The new amount is lower but not zero.
    Reduction,
    /// The new amount is zero.
    Removal,
}

impl AdjustmentType {
    /// Classifies a change from `original` to `new`.
    #[must_use]
    pub fn classify(original: Decimal, new: Decimal) -> Self {
        if new.is_zero() {
            Self::Removal
        } else if new > original {
            Self::Increase
        } else {
            Self::Reduction
        }
    }

    /// Returns the string representation of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Reduction => "reduction",
            Self::Removal => "removal",
        }
    }

    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "increase" => Some(Self::Increase),
            "reduction" => Some(Self::Reduction),
            "removal" => Some(Self::Removal),
            _ => None,
        }
    }
}

/// Lifecycle of an adjustment request.
///
/// `Pending → Approved` or `Pending → Rejected`; both outcomes are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentStatus {
    /// Waiting for an administrator.
    Pending,
    /// Applied to the ledger entry.
    Approved,
    /// Declined; the ledger entry is untouched.
    Rejected,
}

impl AdjustmentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true once a decision was made.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for AdjustmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AdjustmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposed change to a ledger entry's amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentRequest {
    /// Unique identifier.
    pub id: Uuid,
    /// Ledger entry to adjust.
    pub entry_id: Uuid,
    /// Kind of that entry.
    pub item_type: EntryKind,
    /// Live amount when the request was proposed.
    pub original_amount: Decimal,
    /// Requested amount.
    pub new_amount: Decimal,
    /// `new_amount - original_amount`.
    pub adjustment_amount: Decimal,
    /// Direction of the change.
    pub adjustment_type: AdjustmentType,
    /// Currency of the entry.
    pub currency: Currency,
    /// Why the change is requested.
    pub reason: String,
    /// User who proposed it.
    pub requested_by: Uuid,
    /// Display name of that user.
    pub requested_by_name: String,
    /// Current status.
    pub status: AdjustmentStatus,
    /// When the request was proposed.
    pub created_at: DateTime<Utc>,
    /// When it was approved or rejected.
    pub decided_at: Option<DateTime<Utc>>,
    /// Who approved or rejected it.
    pub decided_by: Option<Uuid>,
}

/// Immutable audit record of an approval or rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentDecision {
    /// Unique identifier.
    pub id: Uuid,
    /// The decided request.
    pub request_id: Uuid,
    /// `Approved` or `Rejected`.
    pub decision: AdjustmentStatus,
    /// Rejection reason, or optional approval note.
    pub reason: Option<String>,
    /// Administrator who decided.
    pub decided_by: Uuid,
    /// Display name of the administrator.
    pub decided_by_name: String,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_classify() {
        assert_eq!(AdjustmentType::classify(dec!(100), dec!(120)), AdjustmentType::Increase);
        assert_eq!(AdjustmentType::classify(dec!(100), dec!(80)), AdjustmentType::Reduction);
        assert_eq!(AdjustmentType::classify(dec!(100), dec!(0)), AdjustmentType::Removal);
        assert_eq!(AdjustmentType::classify(dec!(0), dec!(0.00)), AdjustmentType::Removal);
    }

    #[test]
    fn test_status_is_final() {
        assert!(!AdjustmentStatus::Pending.is_final());
        assert!(AdjustmentStatus::Approved.is_final());
        assert!(AdjustmentStatus::Rejected.is_final());
        assert_eq!(AdjustmentStatus::parse("REJECTED"), Some(AdjustmentStatus::Rejected));
    }
}
