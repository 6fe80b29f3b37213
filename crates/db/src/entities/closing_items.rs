//! `SeaORM` Entity for closing_items table (line item snapshots).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{EntryKind, EntryStatus, LogisticStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "closing_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub closing_id: Uuid,
    pub entry_id: Uuid,
    pub position: i32,
    pub kind: EntryKind,
    pub reservation_id: Uuid,
    pub reservation_number: String,
    pub tour_name: String,
    pub client_name: String,
    pub pax: i32,
    pub sale_date: Date,
    pub operation_date: Date,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub original_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub status: EntryStatus,
    pub logistic_status: Option<LogisticStatus>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::closings::Entity",
        from = "Column::ClosingId",
        to = "super::closings::Column::Id"
    )]
    Closings,
    #[sea_orm(
        belongs_to = "super::ledger_entries::Entity",
        from = "Column::EntryId",
        to = "super::ledger_entries::Column::Id"
    )]
    LedgerEntries,
}

impl Related<super::closings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Closings.def()
    }
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
