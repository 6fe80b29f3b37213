//! `SeaORM` Entity for adjustment_decisions table (append-only).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AdjustmentStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "adjustment_decisions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub request_id: Uuid,
    pub decision: AdjustmentStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,
    pub decided_by: Uuid,
    pub decided_by_name: String,
    pub decided_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::adjustment_requests::Entity",
        from = "Column::RequestId",
        to = "super::adjustment_requests::Column::Id"
    )]
    AdjustmentRequests,
}

impl Related<super::adjustment_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdjustmentRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
