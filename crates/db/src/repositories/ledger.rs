//! Ledger repository: listing, recording and status updates.

use chrono::Utc;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, SelectStatement};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, Select, Set, TransactionTrait, Unchanged,
};
use tracing::{info, warn};
use uuid::Uuid;

use itinera_core::ledger::{
    DateType, EntryStatus, LedgerEntry, LedgerFilter, LedgerService, NewLedgerEntry,
};
use itinera_core::{Actor, CommissionError};
use itinera_shared::types::{PageRequest, PageResponse};

use crate::entities::{
    closing_items, closings, ledger_entries, sea_orm_active_enums as db_enums,
};

use super::convert::{active_closing_ids, db_err, entries_from_models, entry_from_model};

/// Ids of entries that belong to an active closing.
pub(crate) fn active_member_ids() -> SelectStatement {
    closing_items::Entity::find()
        .select_only()
        .column(closing_items::Column::EntryId)
        .inner_join(closings::Entity)
        .filter(closings::Column::IsActive.eq(true))
        .into_query()
}

/// Ledger repository.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists entries matching `filter`, newest sale first.
    ///
    /// # Errors
    ///
    /// Returns `CommissionError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &LedgerFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<LedgerEntry>, CommissionError> {
        let query = Self::apply_filter(ledger_entries::Entity::find(), filter);

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let models = query
            .order_by_desc(ledger_entries::Column::SaleDate)
            .order_by_asc(ledger_entries::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let entries = entries_from_models(&self.db, models).await?;
        Ok(PageResponse::new(entries, page, total))
    }

    /// Fetches one entry with its closing membership.
    ///
    /// # Errors
    ///
    /// - `EntryNotFound` for an unknown id
    /// - `Database` if a query fails
    pub async fn get(&self, id: Uuid) -> Result<LedgerEntry, CommissionError> {
        let model = ledger_entries::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(CommissionError::EntryNotFound(id))?;

        let membership = active_closing_ids(&self.db, &[id]).await?;
        entry_from_model(model, membership.get(&id).copied())
    }

    /// Records a new open entry.
    ///
    /// # Errors
    ///
    /// Returns the validation errors of [`LedgerService::prepare_record`], or
    /// `Database` if the insert fails.
    pub async fn record(
        &self,
        input: NewLedgerEntry,
        actor: &Actor,
    ) -> Result<LedgerEntry, CommissionError> {
        let entry = LedgerService::prepare_record(input, actor, Utc::now())?;

        let model = ledger_entries::ActiveModel {
            id: Set(entry.id),
            kind: Set(entry.kind.into()),
            subject_name: Set(entry.subject_name.clone()),
            reservation_id: Set(entry.reservation_id),
            reservation_number: Set(entry.reservation_number.clone()),
            tour_name: Set(entry.tour_name.clone()),
            client_name: Set(entry.client_name.clone()),
            pax: Set(entry.pax),
            sale_date: Set(entry.sale_date),
            operation_date: Set(entry.operation_date),
            gross_amount: Set(entry.gross_amount),
            currency: Set(entry.currency.code().to_string()),
            rate: Set(entry.rate),
            computed_amount: Set(entry.computed_amount),
            cost_amount: Set(entry.cost_amount),
            status: Set(entry.status.into()),
            logistic_status: Set(entry.logistic_status.map(Into::into)),
            created_at: Set(entry.created_at.into()),
            updated_at: Set(entry.updated_at.into()),
        };
        model.insert(&self.db).await.map_err(db_err)?;

        info!(
            entry_id = %entry.id,
            kind = %entry.kind,
            amount = %entry.amount(),
            currency = %entry.currency,
            actor = %actor.user_id,
            "Ledger entry recorded"
        );

        Ok(entry)
    }

    /// Changes the payment status of an open entry.
    ///
    /// The entry row is locked for the duration of the check and update.
    ///
    /// # Errors
    ///
    /// - `EntryNotFound` for an unknown id
    /// - `EntryClosed` if the entry belongs to an active closing
    /// - `InsufficientRole` below finance
    /// - `Database` if a query fails
    pub async fn update_status(
        &self,
        id: Uuid,
        status: EntryStatus,
        actor: &Actor,
    ) -> Result<LedgerEntry, CommissionError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = ledger_entries::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(CommissionError::EntryNotFound(id))?;

        let membership = active_closing_ids(&txn, &[id]).await?;
        let mut entry = entry_from_model(model, membership.get(&id).copied())?;

        if let Err(err) = LedgerService::validate_status_update(&entry, status, actor) {
            warn!(entry_id = %id, error = %err, "Status update rejected");
            return Err(err);
        }

        let now = Utc::now();
        let active = ledger_entries::ActiveModel {
            id: Unchanged(id),
            status: Set(status.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(
            entry_id = %id,
            from = %entry.status,
            to = %status,
            actor = %actor.user_id,
            "Ledger entry status updated"
        );

        entry.status = status;
        entry.updated_at = now;
        Ok(entry)
    }

    fn apply_filter(
        mut query: Select<ledger_entries::Entity>,
        filter: &LedgerFilter,
    ) -> Select<ledger_entries::Entity> {
        let date_column = match filter.date_type {
            DateType::Sale => ledger_entries::Column::SaleDate,
            DateType::Operation => ledger_entries::Column::OperationDate,
        };
        if let Some(from) = filter.date_from {
            query = query.filter(date_column.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(date_column.lte(to));
        }

        if let Some(pattern) = filter.search_pattern() {
            let mut any = Condition::any();
            for column in [
                ledger_entries::Column::SubjectName,
                ledger_entries::Column::ReservationNumber,
                ledger_entries::Column::ClientName,
                ledger_entries::Column::TourName,
            ] {
                any = any.add(Expr::col((ledger_entries::Entity, column)).ilike(pattern.as_str()));
            }
            query = query.filter(any);
        }

        if let Some(subject) = &filter.subject_name {
            query = query.filter(ledger_entries::Column::SubjectName.eq(subject.as_str()));
        }
        if let Some(tour) = &filter.tour_name {
            query = query.filter(ledger_entries::Column::TourName.eq(tour.as_str()));
        }
        if !filter.statuses.is_empty() {
            query = query.filter(
                ledger_entries::Column::Status
                    .is_in(filter.statuses.iter().map(|s| db_enums::EntryStatus::from(*s))),
            );
        }
        if let Some(kind) = filter.kind {
            query = query.filter(ledger_entries::Column::Kind.eq(db_enums::EntryKind::from(kind)));
        }
        if let Some(currency) = filter.currency {
            query = query.filter(ledger_entries::Column::Currency.eq(currency.code()));
        }

        match filter.is_closed {
            Some(true) => query.filter(ledger_entries::Column::Id.in_subquery(active_member_ids())),
            Some(false) => {
                query.filter(ledger_entries::Column::Id.not_in_subquery(active_member_ids()))
            }
            None => query,
        }
    }
}
