//! `SeaORM` Entity for financial_entries table (payables and receivables).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::FinancialEntryKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub closing_id: Uuid,
    pub kind: FinancialEntryKind,
    pub counterparty: String,
    pub invoice_number: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub currency: String,
    pub due_date: Date,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::closings::Entity",
        from = "Column::ClosingId",
        to = "super::closings::Column::Id"
    )]
    Closings,
}

impl Related<super::closings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Closings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
