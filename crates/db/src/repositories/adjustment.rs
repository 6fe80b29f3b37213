//! Adjustment repository.
//!
//! Decisions lock the request row and then the live entry row, so a
//! concurrent closing of the same entry either sees the new amount or makes
//! the approval fail with a conflict.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, Unchanged,
};
use tracing::{info, warn};
use uuid::Uuid;

use itinera_core::adjustment::{
    AdjustmentDecision, AdjustmentRequest, AdjustmentService, AdjustmentStatus,
};
use itinera_core::{Actor, CommissionError};
use itinera_shared::types::{PageRequest, PageResponse};

use crate::entities::{
    adjustment_decisions, adjustment_requests, ledger_entries,
    sea_orm_active_enums as db_enums,
};

use super::convert::{
    active_closing_ids, adjustment_from_model, db_err, decision_from_model, entry_from_model,
};

/// An approved request together with the amount now on the entry.
#[derive(Debug, Clone)]
pub struct AppliedAdjustment {
    /// The request, now approved.
    pub request: AdjustmentRequest,
    /// Audit record that was appended.
    pub decision: AdjustmentDecision,
    /// Live amount of the entry after approval.
    pub applied_amount: Decimal,
}

/// A rejected request.
#[derive(Debug, Clone)]
pub struct RejectedAdjustment {
    /// The request, now rejected.
    pub request: AdjustmentRequest,
    /// Audit record that was appended.
    pub decision: AdjustmentDecision,
}

/// Adjustment repository.
#[derive(Debug, Clone)]
pub struct AdjustmentRepository {
    db: DatabaseConnection,
}

impl AdjustmentRepository {
    /// Creates a new adjustment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists requests, newest first. `None` lists every status.
    ///
    /// # Errors
    ///
    /// Returns `CommissionError::Database` if a query fails.
    pub async fn list(
        &self,
        status: Option<AdjustmentStatus>,
        page: &PageRequest,
    ) -> Result<PageResponse<AdjustmentRequest>, CommissionError> {
        let mut query = adjustment_requests::Entity::find();
        if let Some(status) = status {
            query = query
                .filter(adjustment_requests::Column::Status.eq(db_enums::AdjustmentStatus::from(status)));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let requests = query
            .order_by_desc(adjustment_requests::Column::CreatedAt)
            .order_by_asc(adjustment_requests::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(adjustment_from_model)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PageResponse::new(requests, page, total))
    }

    /// Fetches one request.
    ///
    /// # Errors
    ///
    /// - `AdjustmentNotFound` for an unknown id
    /// - `Database` if a query fails
    pub async fn get(&self, id: Uuid) -> Result<AdjustmentRequest, CommissionError> {
        let model = adjustment_requests::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(CommissionError::AdjustmentNotFound(id))?;
        adjustment_from_model(model)
    }

    /// Audit trail of decisions on a request, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `CommissionError::Database` if a query fails.
    pub async fn decisions(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<AdjustmentDecision>, CommissionError> {
        let models = adjustment_decisions::Entity::find()
            .filter(adjustment_decisions::Column::RequestId.eq(request_id))
            .order_by_asc(adjustment_decisions::Column::DecidedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(decision_from_model).collect())
    }

    /// Proposes a new amount for an entry.
    ///
    /// # Errors
    ///
    /// - `EntryNotFound` for an unknown entry
    /// - the validation errors of [`AdjustmentService::propose`]
    /// - `Database` if a query fails
    pub async fn propose(
        &self,
        entry_id: Uuid,
        new_amount: Decimal,
        reason: &str,
        actor: &Actor,
    ) -> Result<AdjustmentRequest, CommissionError> {
        let model = ledger_entries::Entity::find_by_id(entry_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(CommissionError::EntryNotFound(entry_id))?;
        let membership = active_closing_ids(&self.db, &[entry_id]).await?;
        let entry = entry_from_model(model, membership.get(&entry_id).copied())?;

        let request = AdjustmentService::propose(&entry, new_amount, reason, actor, Utc::now())?;

        adjustment_requests::ActiveModel {
            id: Set(request.id),
            entry_id: Set(request.entry_id),
            item_type: Set(request.item_type.into()),
            original_amount: Set(request.original_amount),
            new_amount: Set(request.new_amount),
            adjustment_amount: Set(request.adjustment_amount),
            adjustment_type: Set(request.adjustment_type.into()),
            currency: Set(request.currency.code().to_string()),
            reason: Set(request.reason.clone()),
            requested_by: Set(request.requested_by),
            requested_by_name: Set(request.requested_by_name.clone()),
            status: Set(db_enums::AdjustmentStatus::Pending),
            created_at: Set(request.created_at.into()),
            decided_at: Set(None),
            decided_by: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        info!(
            request_id = %request.id,
            entry_id = %entry_id,
            original = %request.original_amount,
            proposed = %request.new_amount,
            actor = %actor.user_id,
            "Adjustment proposed"
        );

        Ok(request)
    }

    /// Approves a pending request and writes its amount to the live entry.
    ///
    /// # Errors
    ///
    /// - `AdjustmentNotFound` for an unknown request
    /// - `AdminRequired` for non-admin actors
    /// - `AdjustmentNotPending` if it was already decided
    /// - `EntryClosed` if the entry belongs to an active closing
    /// - `Database` if a query fails
    pub async fn approve(
        &self,
        request_id: Uuid,
        note: Option<String>,
        actor: &Actor,
    ) -> Result<AppliedAdjustment, CommissionError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let request = Self::lock_request(&txn, request_id).await?;

        let entry_model = ledger_entries::Entity::find_by_id(request.entry_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(CommissionError::EntryNotFound(request.entry_id))?;
        let membership = active_closing_ids(&txn, &[request.entry_id]).await?;
        let entry = entry_from_model(entry_model, membership.get(&request.entry_id).copied())?;

        let outcome = match AdjustmentService::approve(&request, &entry, note, actor, Utc::now()) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(request_id = %request_id, error = %err, "Adjustment approval rejected");
                return Err(err);
            }
        };

        ledger_entries::ActiveModel {
            id: Unchanged(outcome.entry.id),
            computed_amount: Set(outcome.entry.computed_amount),
            cost_amount: Set(outcome.entry.cost_amount),
            updated_at: Set(outcome.entry.updated_at.into()),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(db_err)?;

        Self::record_decision(&txn, &outcome.request, &outcome.decision).await?;
        txn.commit().await.map_err(db_err)?;

        let applied_amount = outcome.applied_amount();
        info!(
            request_id = %request_id,
            entry_id = %outcome.entry.id,
            amount = %applied_amount,
            actor = %actor.user_id,
            "Adjustment approved"
        );

        Ok(AppliedAdjustment {
            request: outcome.request,
            decision: outcome.decision,
            applied_amount,
        })
    }

    /// Rejects a pending request. The entry is not touched.
    ///
    /// # Errors
    ///
    /// - `ReasonRequired` for a blank reason
    /// - `AdjustmentNotFound` for an unknown request
    /// - `AdminRequired` for non-admin actors
    /// - `AdjustmentNotPending` if it was already decided
    /// - `Database` if a query fails
    pub async fn reject(
        &self,
        request_id: Uuid,
        reason: &str,
        actor: &Actor,
    ) -> Result<RejectedAdjustment, CommissionError> {
        if reason.trim().is_empty() {
            return Err(CommissionError::ReasonRequired("reject an adjustment"));
        }

        let txn = self.db.begin().await.map_err(db_err)?;
        let request = Self::lock_request(&txn, request_id).await?;

        let outcome = match AdjustmentService::reject(&request, reason, actor, Utc::now()) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(request_id = %request_id, error = %err, "Adjustment rejection refused");
                return Err(err);
            }
        };

        Self::record_decision(&txn, &outcome.request, &outcome.decision).await?;
        txn.commit().await.map_err(db_err)?;

        info!(
            request_id = %request_id,
            entry_id = %outcome.request.entry_id,
            actor = %actor.user_id,
            "Adjustment rejected"
        );

        Ok(RejectedAdjustment {
            request: outcome.request,
            decision: outcome.decision,
        })
    }

    async fn lock_request(
        txn: &DatabaseTransaction,
        request_id: Uuid,
    ) -> Result<AdjustmentRequest, CommissionError> {
        let model = adjustment_requests::Entity::find_by_id(request_id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or(CommissionError::AdjustmentNotFound(request_id))?;
        adjustment_from_model(model)
    }

    async fn record_decision(
        txn: &DatabaseTransaction,
        request: &AdjustmentRequest,
        decision: &AdjustmentDecision,
    ) -> Result<(), CommissionError> {
        adjustment_requests::ActiveModel {
            id: Unchanged(request.id),
            status: Set(request.status.into()),
            decided_at: Set(request.decided_at.map(Into::into)),
            decided_by: Set(request.decided_by),
            ..Default::default()
        }
        .update(txn)
        .await
        .map_err(db_err)?;

        adjustment_decisions::ActiveModel {
            id: Set(decision.id),
            request_id: Set(decision.request_id),
            decision: Set(decision.decision.into()),
            reason: Set(decision.reason.clone()),
            decided_by: Set(decision.decided_by),
            decided_by_name: Set(decision.decided_by_name.clone()),
            decided_at: Set(decision.decided_at.into()),
        }
        .insert(txn)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}
