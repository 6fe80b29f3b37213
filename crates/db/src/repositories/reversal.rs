//! Reversal repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait, Unchanged,
};
use tracing::{info, warn};
use uuid::Uuid;

use itinera_core::closing::ClosingDetail;
use itinera_core::reversal::ReversalService;
use itinera_core::{Actor, CommissionError};

use crate::entities::{closing_reversals, closings, financial_entries};

use super::closing::line_items;
use super::convert::{closing_from_model, db_err};

/// Reversal repository.
#[derive(Debug, Clone)]
pub struct ReversalRepository {
    db: DatabaseConnection,
}

impl ReversalRepository {
    /// Creates a new reversal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Undoes an active closing.
    ///
    /// In one transaction: the closing row is locked and deactivated, its
    /// payable or receivable is deleted, and a reversal record is appended.
    /// Line items stay for audit; they stop sealing their entries because
    /// membership only counts active closings.
    ///
    /// # Errors
    ///
    /// - `ReasonRequired` for a blank reason
    /// - `AdminRequired` for non-admin actors
    /// - `ClosingNotFound` for an unknown id
    /// - `ClosingInactive` if the closing was already undone
    /// - `Database` if a query fails
    pub async fn undo(
        &self,
        closing_id: Uuid,
        reason: &str,
        actor: &Actor,
    ) -> Result<ClosingDetail, CommissionError> {
        if let Err(err) = ReversalService::authorize(reason, actor) {
            warn!(closing_id = %closing_id, error = %err, "Reversal rejected");
            return Err(err);
        }

        let txn = self.db.begin().await.map_err(db_err)?;

        let model = closings::Entity::find_by_id(closing_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(CommissionError::ClosingNotFound(closing_id))?;
        let closing = closing_from_model(model)?;
        let items = line_items(&txn, closing_id).await?;

        let plan = match ReversalService::plan(&closing, &items, reason, actor, Utc::now()) {
            Ok(plan) => plan,
            Err(err) => {
                warn!(closing_id = %closing_id, error = %err, "Reversal rejected");
                return Err(err);
            }
        };

        closings::ActiveModel {
            id: Unchanged(closing_id),
            is_active: Set(false),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(db_err)?;

        financial_entries::Entity::delete_many()
            .filter(financial_entries::Column::ClosingId.eq(closing_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let record = &plan.record;
        closing_reversals::ActiveModel {
            id: Set(record.id),
            closing_id: Set(record.closing_id),
            reason: Set(record.reason.clone()),
            undone_by: Set(record.undone_by),
            undone_by_name: Set(record.undone_by_name.clone()),
            undone_at: Set(record.undone_at.into()),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(
            closing_id = %closing_id,
            invoice_number = %plan.closing.invoice_label(),
            released = plan.released_entry_ids.len(),
            actor = %actor.user_id,
            "Closing reversed"
        );

        Ok(ClosingDetail {
            closing: plan.closing,
            items,
            reversal: Some(plan.record),
        })
    }
}
