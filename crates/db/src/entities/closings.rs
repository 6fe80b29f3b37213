//! `SeaORM` Entity for closings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ClosingType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "closings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub closing_type: ClosingType,
    pub invoice_number: i64,
    pub recipient_name: String,
    pub period_start: Date,
    pub period_end: Date,
    pub currency: String,
    pub item_count: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub created_by: Uuid,
    pub created_by_name: String,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::closing_items::Entity")]
    ClosingItems,
    #[sea_orm(has_one = "super::financial_entries::Entity")]
    FinancialEntries,
    #[sea_orm(has_one = "super::closing_reversals::Entity")]
    ClosingReversals,
}

impl Related<super::closing_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClosingItems.def()
    }
}

impl Related<super::financial_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialEntries.def()
    }
}

impl Related<super::closing_reversals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClosingReversals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
