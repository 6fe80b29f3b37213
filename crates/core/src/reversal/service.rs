//! Undo of a closing.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::actor::Actor;
use crate::closing::{Closing, ClosingLineItem};
use crate::error::CommissionError;
use crate::reversal::types::{ReversalPlan, ReversalRecord};

const ACTION: &str = "reverse a closing";

/// Stateless reversal service.
pub struct ReversalService;

impl ReversalService {
    /// Checks the parts of an undo request that need no stored state.
    ///
    /// Returns the trimmed reason.
    ///
    /// # Errors
    ///
    /// - `ReasonRequired` if `reason` is blank
    /// - `AdminRequired` for non-admin actors
    pub fn authorize<'a>(reason: &'a str, actor: &Actor) -> Result<&'a str, CommissionError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(CommissionError::ReasonRequired(ACTION));
        }
        actor.require_admin(ACTION)?;
        Ok(reason)
    }

    /// Plans the undo of `closing`.
    ///
    /// `items` are the closing's line items; their entries are released.
    /// Override amounts recorded on the items are discarded with them, the
    /// live entries keep whatever amount they had.
    ///
    /// # Errors
    ///
    /// - everything [`Self::authorize`] returns
    /// - `ClosingInactive` if the closing was already undone
    pub fn plan(
        closing: &Closing,
        items: &[ClosingLineItem],
        reason: &str,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<ReversalPlan, CommissionError> {
        let reason = Self::authorize(reason, actor)?;

        if !closing.is_active {
            return Err(CommissionError::ClosingInactive(closing.id));
        }

        let record = ReversalRecord {
            id: Uuid::new_v4(),
            closing_id: closing.id,
            reason: reason.to_string(),
            undone_by: actor.user_id,
            undone_by_name: actor.name.clone(),
            undone_at: now,
        };

        Ok(ReversalPlan {
            closing: Closing {
                is_active: false,
                ..closing.clone()
            },
            record,
            released_entry_ids: items.iter().map(|item| item.entry_id).collect(),
        })
    }
}
