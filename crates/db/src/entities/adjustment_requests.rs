//! `SeaORM` Entity for adjustment_requests table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{AdjustmentStatus, AdjustmentType, EntryKind};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "adjustment_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub entry_id: Uuid,
    pub item_type: EntryKind,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub original_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub new_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub adjustment_amount: Decimal,
    pub adjustment_type: AdjustmentType,
    pub currency: String,
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub requested_by: Uuid,
    pub requested_by_name: String,
    pub status: AdjustmentStatus,
    pub created_at: DateTimeWithTimeZone,
    pub decided_at: Option<DateTimeWithTimeZone>,
    pub decided_by: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ledger_entries::Entity",
        from = "Column::EntryId",
        to = "super::ledger_entries::Column::Id"
    )]
    LedgerEntries,
    #[sea_orm(has_many = "super::adjustment_decisions::Entity")]
    AdjustmentDecisions,
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl Related<super::adjustment_decisions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdjustmentDecisions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
