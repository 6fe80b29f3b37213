//! Closing repository.
//!
//! A closing is persisted in one transaction: the selected ledger rows are
//! locked in id order, membership is re-read under the lock, the engine
//! validates the batch, and only then is an invoice number drawn from the
//! per-type counter. Any failure rolls everything back, counter included.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, Statement,
    TransactionTrait, Value,
};
use tracing::{info, warn};
use uuid::Uuid;

use itinera_core::closing::{
    CloseRequest, Closing, ClosingDetail, ClosingDraft, ClosingEngine, ClosingLineItem,
    ClosingType,
};
use itinera_core::{Actor, CommissionError, Role};
use itinera_shared::types::{PageRequest, PageResponse};

use crate::entities::{
    closing_items, closing_reversals, closings, financial_entries, ledger_entries,
    sea_orm_active_enums as db_enums,
};

use super::convert::{
    closing_from_model, db_err, entries_from_models, item_from_model, reversal_from_model,
};

const NEXT_INVOICE_NUMBER_SQL: &str = r"
INSERT INTO invoice_counters (closing_type, last_number)
VALUES ($1::closing_type, 1)
ON CONFLICT (closing_type)
DO UPDATE SET last_number = invoice_counters.last_number + 1
RETURNING last_number
";

/// Filter for closing listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosingFilter {
    /// Only closings of this type.
    pub closing_type: Option<ClosingType>,
    /// Only active (`true`) or reversed (`false`) closings.
    pub is_active: Option<bool>,
}

/// Closing repository.
#[derive(Debug, Clone)]
pub struct ClosingRepository {
    db: DatabaseConnection,
}

impl ClosingRepository {
    /// Creates a new closing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Closes a batch of ledger entries.
    ///
    /// All-or-nothing: the closing, its line items and its payable or
    /// receivable commit together, or nothing is written.
    ///
    /// # Errors
    ///
    /// - the errors of [`ClosingEngine::prepare`], naming the offending entry
    /// - `Database` if a query fails
    pub async fn close(
        &self,
        request: &CloseRequest,
        actor: &Actor,
    ) -> Result<ClosingDetail, CommissionError> {
        actor.require_role(Role::Finance)?;
        ClosingEngine::validate_request(request)?;

        let mut lock_order = request.entry_ids.clone();
        lock_order.sort_unstable();

        let txn = self.db.begin().await.map_err(db_err)?;

        let models = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::Id.is_in(lock_order))
            .order_by_asc(ledger_entries::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await
            .map_err(db_err)?;
        let entries = entries_from_models(&txn, models).await?;

        let plan = match ClosingEngine::prepare(request, &entries, actor, Utc::now()) {
            Ok(plan) => plan,
            Err(err) => {
                warn!(
                    closing_type = %request.closing_type,
                    entry_count = request.entry_ids.len(),
                    error = %err,
                    "Closing rejected"
                );
                return Err(err);
            }
        };

        let invoice_number = Self::next_invoice_number(&txn, request.closing_type).await?;
        let draft = plan.seal(invoice_number);
        Self::insert_draft(&txn, &draft).await?;

        txn.commit().await.map_err(db_err)?;

        info!(
            closing_id = %draft.closing.id,
            invoice_number = %draft.closing.invoice_label(),
            closing_type = %draft.closing.closing_type,
            entry_count = draft.items.len(),
            total = %draft.closing.total_amount,
            currency = %draft.closing.currency,
            actor = %actor.user_id,
            "Closing created"
        );

        Ok(ClosingDetail {
            closing: draft.closing,
            items: draft.items,
            reversal: None,
        })
    }

    /// Lists closings, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CommissionError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: ClosingFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<Closing>, CommissionError> {
        let mut query = closings::Entity::find();
        if let Some(closing_type) = filter.closing_type {
            query = query
                .filter(closings::Column::ClosingType.eq(db_enums::ClosingType::from(closing_type)));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(closings::Column::IsActive.eq(is_active));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let closings = query
            .order_by_desc(closings::Column::CreatedAt)
            .order_by_desc(closings::Column::InvoiceNumber)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(closing_from_model)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PageResponse::new(closings, page, total))
    }

    /// Fetches a closing with its line items and reversal record.
    ///
    /// # Errors
    ///
    /// - `ClosingNotFound` for an unknown id
    /// - `Database` if a query fails
    pub async fn detail(&self, id: Uuid) -> Result<ClosingDetail, CommissionError> {
        let closing = closings::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(CommissionError::ClosingNotFound(id))?;

        let items = line_items(&self.db, id).await?;

        let reversal = closing_reversals::Entity::find()
            .filter(closing_reversals::Column::ClosingId.eq(id))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(reversal_from_model);

        Ok(ClosingDetail {
            closing: closing_from_model(closing)?,
            items,
            reversal,
        })
    }

    async fn next_invoice_number(
        txn: &DatabaseTransaction,
        closing_type: ClosingType,
    ) -> Result<i64, CommissionError> {
        let row = txn
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                NEXT_INVOICE_NUMBER_SQL,
                [Value::from(closing_type.as_str())],
            ))
            .await
            .map_err(db_err)?
            .ok_or_else(|| {
                CommissionError::Database(format!("no invoice number returned for {closing_type}"))
            })?;

        row.try_get::<i64>("", "last_number").map_err(db_err)
    }

    async fn insert_draft(
        txn: &DatabaseTransaction,
        draft: &ClosingDraft,
    ) -> Result<(), CommissionError> {
        let closing = &draft.closing;
        closings::ActiveModel {
            id: Set(closing.id),
            closing_type: Set(closing.closing_type.into()),
            invoice_number: Set(closing.invoice_number),
            recipient_name: Set(closing.recipient_name.clone()),
            period_start: Set(closing.period_start),
            period_end: Set(closing.period_end),
            currency: Set(closing.currency.code().to_string()),
            item_count: Set(closing.item_count),
            total_amount: Set(closing.total_amount),
            created_at: Set(closing.created_at.into()),
            created_by: Set(closing.created_by),
            created_by_name: Set(closing.created_by_name.clone()),
            is_active: Set(true),
        }
        .insert(txn)
        .await
        .map_err(db_err)?;

        let items = draft
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| item_model(item, position))
            .collect::<Result<Vec<_>, _>>()?;
        closing_items::Entity::insert_many(items)
            .exec(txn)
            .await
            .map_err(db_err)?;

        let financial = &draft.financial_entry;
        financial_entries::ActiveModel {
            id: Set(financial.id),
            closing_id: Set(financial.closing_id),
            kind: Set(financial.kind.into()),
            counterparty: Set(financial.counterparty.clone()),
            invoice_number: Set(financial.invoice_number.clone()),
            description: Set(financial.description.clone()),
            amount: Set(financial.amount),
            currency: Set(financial.currency.code().to_string()),
            due_date: Set(financial.due_date),
            created_at: Set(financial.created_at.into()),
        }
        .insert(txn)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}

/// Line items of a closing in selection order.
pub(crate) async fn line_items<C: ConnectionTrait>(
    conn: &C,
    closing_id: Uuid,
) -> Result<Vec<ClosingLineItem>, CommissionError> {
    let models = closing_items::Entity::find()
        .filter(closing_items::Column::ClosingId.eq(closing_id))
        .order_by_asc(closing_items::Column::Position)
        .all(conn)
        .await
        .map_err(db_err)?;
    Ok(models.into_iter().map(item_from_model).collect())
}

fn item_model(
    item: &ClosingLineItem,
    position: usize,
) -> Result<closing_items::ActiveModel, CommissionError> {
    let position = i32::try_from(position)
        .map_err(|_| CommissionError::Internal("line item position out of range".to_string()))?;
    Ok(closing_items::ActiveModel {
        id: Set(item.id),
        closing_id: Set(item.closing_id),
        entry_id: Set(item.entry_id),
        position: Set(position),
        kind: Set(item.kind.into()),
        reservation_id: Set(item.reservation_id),
        reservation_number: Set(item.reservation_number.clone()),
        tour_name: Set(item.tour_name.clone()),
        client_name: Set(item.client_name.clone()),
        pax: Set(item.pax),
        sale_date: Set(item.sale_date),
        operation_date: Set(item.operation_date),
        original_amount: Set(item.original_amount),
        amount: Set(item.amount),
        status: Set(item.status.into()),
        logistic_status: Set(item.logistic_status.map(Into::into)),
    })
}
