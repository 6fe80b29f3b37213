//! Payables and receivables registered by closings.

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use itinera_core::CommissionError;
use itinera_core::closing::{FinancialEntry, FinancialEntryKind};
use itinera_shared::types::{PageRequest, PageResponse};

use crate::entities::{financial_entries, sea_orm_active_enums as db_enums};

use super::convert::{db_err, financial_from_model};

/// Financial entry repository.
#[derive(Debug, Clone)]
pub struct FinancialRepository {
    db: DatabaseConnection,
}

impl FinancialRepository {
    /// Creates a new financial entry repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists payables and/or receivables, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CommissionError::Database` if a query fails.
    pub async fn list(
        &self,
        kind: Option<FinancialEntryKind>,
        page: &PageRequest,
    ) -> Result<PageResponse<FinancialEntry>, CommissionError> {
        let mut query = financial_entries::Entity::find();
        if let Some(kind) = kind {
            query = query
                .filter(financial_entries::Column::Kind.eq(db_enums::FinancialEntryKind::from(kind)));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let entries = query
            .order_by_desc(financial_entries::Column::CreatedAt)
            .order_by_asc(financial_entries::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(financial_from_model)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PageResponse::new(entries, page, total))
    }
}
