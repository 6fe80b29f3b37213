//! Conversions between `SeaORM` models and core domain types.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use itinera_core::CommissionError;
use itinera_core::adjustment::{AdjustmentDecision, AdjustmentRequest};
use itinera_core::closing::{Closing, ClosingLineItem, FinancialEntry};
use itinera_core::ledger::LedgerEntry;
use itinera_core::reversal::ReversalRecord;
use itinera_shared::types::Currency;

use crate::entities::{
    adjustment_decisions, adjustment_requests, closing_items, closing_reversals, closings,
    financial_entries, ledger_entries, sea_orm_active_enums as db_enums,
};

/// Maps a database error into the domain taxonomy.
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn db_err(err: DbErr) -> CommissionError {
    CommissionError::Database(err.to_string())
}

/// Mirrors a core enum onto its `SeaORM` active enum, both ways.
macro_rules! enum_bridge {
    ($core:ty, $db:ty, [$($variant:ident),+ $(,)?]) => {
        impl From<$core> for $db {
            fn from(value: $core) -> Self {
                type Source = $core;
                match value {
                    $(Source::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$db> for $core {
            fn from(value: $db) -> Self {
                type Source = $db;
                match value {
                    $(Source::$variant => Self::$variant,)+
                }
            }
        }
    };
}

enum_bridge!(
    itinera_core::ledger::EntryKind,
    db_enums::EntryKind,
    [Commission, OperatorPayment]
);
enum_bridge!(
    itinera_core::ledger::EntryStatus,
    db_enums::EntryStatus,
    [Pending, Approved, Paid, Cancelled]
);
enum_bridge!(
    itinera_core::ledger::LogisticStatus,
    db_enums::LogisticStatus,
    [Pending, Confirmed, InProgress, Completed, NoShow, Cancelled]
);
enum_bridge!(
    itinera_core::adjustment::AdjustmentType,
    db_enums::AdjustmentType,
    [Increase, Reduction, Removal]
);
enum_bridge!(
    itinera_core::adjustment::AdjustmentStatus,
    db_enums::AdjustmentStatus,
    [Pending, Approved, Rejected]
);
enum_bridge!(
    itinera_core::closing::ClosingType,
    db_enums::ClosingType,
    [Salesperson, Agency, Operator]
);
enum_bridge!(
    itinera_core::closing::FinancialEntryKind,
    db_enums::FinancialEntryKind,
    [Payable, Receivable]
);

pub(crate) fn parse_currency(code: &str) -> Result<Currency, CommissionError> {
    code.parse().map_err(CommissionError::Database)
}

pub(crate) fn utc(at: DateTime<FixedOffset>) -> DateTime<Utc> {
    at.with_timezone(&Utc)
}

/// Active closing id of each entry in `entry_ids` that belongs to one.
///
/// Membership is always derived from `closing_items` joined to active
/// closings; there is no stored flag.
pub(crate) async fn active_closing_ids<C: ConnectionTrait>(
    conn: &C,
    entry_ids: &[Uuid],
) -> Result<HashMap<Uuid, Uuid>, CommissionError> {
    if entry_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(Uuid, Uuid)> = closing_items::Entity::find()
        .select_only()
        .column(closing_items::Column::EntryId)
        .column(closing_items::Column::ClosingId)
        .inner_join(closings::Entity)
        .filter(closings::Column::IsActive.eq(true))
        .filter(closing_items::Column::EntryId.is_in(entry_ids.iter().copied()))
        .into_tuple()
        .all(conn)
        .await
        .map_err(db_err)?;

    Ok(rows.into_iter().collect())
}

pub(crate) fn entry_from_model(
    model: ledger_entries::Model,
    closing_id: Option<Uuid>,
) -> Result<LedgerEntry, CommissionError> {
    Ok(LedgerEntry {
        id: model.id,
        kind: model.kind.into(),
        subject_name: model.subject_name,
        reservation_id: model.reservation_id,
        reservation_number: model.reservation_number,
        tour_name: model.tour_name,
        client_name: model.client_name,
        pax: model.pax,
        sale_date: model.sale_date,
        operation_date: model.operation_date,
        gross_amount: model.gross_amount,
        currency: parse_currency(&model.currency)?,
        rate: model.rate,
        computed_amount: model.computed_amount,
        cost_amount: model.cost_amount,
        status: model.status.into(),
        logistic_status: model.logistic_status.map(Into::into),
        closing_id,
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    })
}

/// Converts a page of entry models, resolving closing membership in one query.
pub(crate) async fn entries_from_models<C: ConnectionTrait>(
    conn: &C,
    models: Vec<ledger_entries::Model>,
) -> Result<Vec<LedgerEntry>, CommissionError> {
    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let membership = active_closing_ids(conn, &ids).await?;
    models
        .into_iter()
        .map(|model| {
            let closing_id = membership.get(&model.id).copied();
            entry_from_model(model, closing_id)
        })
        .collect()
}

pub(crate) fn adjustment_from_model(
    model: adjustment_requests::Model,
) -> Result<AdjustmentRequest, CommissionError> {
    Ok(AdjustmentRequest {
        id: model.id,
        entry_id: model.entry_id,
        item_type: model.item_type.into(),
        original_amount: model.original_amount,
        new_amount: model.new_amount,
        adjustment_amount: model.adjustment_amount,
        adjustment_type: model.adjustment_type.into(),
        currency: parse_currency(&model.currency)?,
        reason: model.reason,
        requested_by: model.requested_by,
        requested_by_name: model.requested_by_name,
        status: model.status.into(),
        created_at: utc(model.created_at),
        decided_at: model.decided_at.map(utc),
        decided_by: model.decided_by,
    })
}

pub(crate) fn decision_from_model(model: adjustment_decisions::Model) -> AdjustmentDecision {
    AdjustmentDecision {
        id: model.id,
        request_id: model.request_id,
        decision: model.decision.into(),
        reason: model.reason,
        decided_by: model.decided_by,
        decided_by_name: model.decided_by_name,
        decided_at: utc(model.decided_at),
    }
}

pub(crate) fn closing_from_model(model: closings::Model) -> Result<Closing, CommissionError> {
    Ok(Closing {
        id: model.id,
        invoice_number: model.invoice_number,
        closing_type: model.closing_type.into(),
        recipient_name: model.recipient_name,
        period_start: model.period_start,
        period_end: model.period_end,
        currency: parse_currency(&model.currency)?,
        item_count: model.item_count,
        total_amount: model.total_amount,
        created_at: utc(model.created_at),
        created_by: model.created_by,
        created_by_name: model.created_by_name,
        is_active: model.is_active,
    })
}

pub(crate) fn item_from_model(model: closing_items::Model) -> ClosingLineItem {
    ClosingLineItem {
        id: model.id,
        closing_id: model.closing_id,
        entry_id: model.entry_id,
        kind: model.kind.into(),
        reservation_id: model.reservation_id,
        reservation_number: model.reservation_number,
        tour_name: model.tour_name,
        client_name: model.client_name,
        pax: model.pax,
        sale_date: model.sale_date,
        operation_date: model.operation_date,
        original_amount: model.original_amount,
        amount: model.amount,
        status: model.status.into(),
        logistic_status: model.logistic_status.map(Into::into),
    }
}

pub(crate) fn financial_from_model(
    model: financial_entries::Model,
) -> Result<FinancialEntry, CommissionError> {
    Ok(FinancialEntry {
        id: model.id,
        closing_id: model.closing_id,
        kind: model.kind.into(),
        counterparty: model.counterparty,
        invoice_number: model.invoice_number,
        description: model.description,
        amount: model.amount,
        currency: parse_currency(&model.currency)?,
        due_date: model.due_date,
        created_at: utc(model.created_at),
    })
}

pub(crate) fn reversal_from_model(model: closing_reversals::Model) -> ReversalRecord {
    ReversalRecord {
        id: model.id,
        closing_id: model.closing_id,
        reason: model.reason,
        undone_by: model.undone_by,
        undone_by_name: model.undone_by_name,
        undone_at: utc(model.undone_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itinera_core::ledger::{EntryKind, LogisticStatus};

    #[test]
    fn test_enum_bridge_round_trips() {
        for status in [
            LogisticStatus::Pending,
            LogisticStatus::Confirmed,
            LogisticStatus::InProgress,
            LogisticStatus::Completed,
            LogisticStatus::NoShow,
            LogisticStatus::Cancelled,
        ] {
            let stored: db_enums::LogisticStatus = status.into();
            assert_eq!(LogisticStatus::from(stored), status);
        }
        assert_eq!(
            db_enums::EntryKind::from(EntryKind::OperatorPayment),
            db_enums::EntryKind::OperatorPayment
        );
    }

    #[test]
    fn test_unknown_currency_is_a_database_error() {
        assert!(matches!(
            parse_currency("XXX"),
            Err(CommissionError::Database(_))
        ));
        assert_eq!(parse_currency("usd").unwrap(), Currency::Usd);
    }
}
