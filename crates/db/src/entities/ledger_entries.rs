//! `SeaORM` Entity for ledger_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{EntryKind, EntryStatus, LogisticStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: EntryKind,
    pub subject_name: String,
    pub reservation_id: Uuid,
    pub reservation_number: String,
    pub tour_name: String,
    pub client_name: String,
    pub pax: i32,
    pub sale_date: Date,
    pub operation_date: Date,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub gross_amount: Decimal,
    pub currency: String,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))", nullable)]
    pub rate: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub computed_amount: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub cost_amount: Option<Decimal>,
    pub status: EntryStatus,
    pub logistic_status: Option<LogisticStatus>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::closing_items::Entity")]
    ClosingItems,
    #[sea_orm(has_many = "super::adjustment_requests::Entity")]
    AdjustmentRequests,
}

impl Related<super::closing_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClosingItems.def()
    }
}

impl Related<super::adjustment_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdjustmentRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
