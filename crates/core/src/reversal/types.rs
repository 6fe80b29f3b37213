//! Reversal domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::closing::Closing;

/// Audit record of an undone closing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReversalRecord {
    /// Unique identifier.
    pub id: Uuid,
    /// The undone closing.
    pub closing_id: Uuid,
    /// Why it was undone.
    pub reason: String,
    /// Administrator who undid it.
    pub undone_by: Uuid,
    /// Display name of the administrator.
    pub undone_by_name: String,
    /// When it was undone.
    pub undone_at: DateTime<Utc>,
}

/// Everything a committed reversal writes.
#[derive(Debug, Clone)]
pub struct ReversalPlan {
    /// The closing with `is_active = false`.
    pub closing: Closing,
    /// Record to append.
    pub record: ReversalRecord,
    /// Entries that become open again.
    pub released_entry_ids: Vec<Uuid>,
}
