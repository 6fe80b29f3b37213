//! Forecast repository.

use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};

use itinera_core::CommissionError;
use itinera_core::forecast::{Forecast, ForecastBucket, ForecastService};

use crate::entities::{ledger_entries, sea_orm_active_enums as db_enums};

use super::convert::{db_err, parse_currency};
use super::ledger::active_member_ids;

/// Live amount of each row, read from the column that belongs to its kind.
const AMOUNT_SUM_SQL: &str = "COALESCE(SUM(CASE kind \
     WHEN 'commission' THEN computed_amount \
     ELSE cost_amount END), 0)";

/// Forecast repository.
#[derive(Debug, Clone)]
pub struct ForecastRepository {
    db: DatabaseConnection,
}

impl ForecastRepository {
    /// Creates a new forecast repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Sums open entries per kind and currency, whatever their status.
    ///
    /// # Errors
    ///
    /// Returns `CommissionError::Database` if the query fails or a stored
    /// currency code is unknown.
    pub async fn forecast(&self) -> Result<Forecast, CommissionError> {
        let rows: Vec<(db_enums::EntryKind, String, Decimal, i64)> =
            ledger_entries::Entity::find()
                .select_only()
                .column(ledger_entries::Column::Kind)
                .column(ledger_entries::Column::Currency)
                .column_as(
                    Expr::cust(AMOUNT_SUM_SQL),
                    "amount",
                )
                .column_as(Expr::col(ledger_entries::Column::Id).count(), "count")
                .filter(ledger_entries::Column::Id.not_in_subquery(active_member_ids()))
                .group_by(ledger_entries::Column::Kind)
                .group_by(ledger_entries::Column::Currency)
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(db_err)?;

        let mut income = Vec::new();
        let mut liabilities = Vec::new();
        for (kind, code, amount, count) in rows {
            let bucket = ForecastBucket::new(
                parse_currency(&code)?,
                amount,
                u64::try_from(count).unwrap_or_default(),
            );
            match kind {
                db_enums::EntryKind::Commission => income.push(bucket),
                db_enums::EntryKind::OperatorPayment => liabilities.push(bucket),
            }
        }

        Ok(ForecastService::from_totals(income, liabilities))
    }
}
