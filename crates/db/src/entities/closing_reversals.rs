//! `SeaORM` Entity for closing_reversals table (append-only).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "closing_reversals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub closing_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub undone_by: Uuid,
    pub undone_by_name: String,
    pub undone_at: DateTimeWithTimeZone,
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
