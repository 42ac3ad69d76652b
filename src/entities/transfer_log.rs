//! Transfer log entity - Provenance of a budget item that moved between plans.
//! Rows are only ever inserted; the autoincrement id preserves chain order.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transfer log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transfer_logs")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Budget item currently carrying this log
    pub item_id: String,
    /// When the transfer happened
    pub date: DateTimeUtc,
    /// Plan the item left
    pub from_plan_id: String,
    /// IO code of the plan the item left
    pub from_io_no: String,
    /// Plan the item joined
    pub to_plan_id: String,
    /// IO code of the plan the item joined
    pub to_io_no: String,
    /// Why the item was moved
    pub reason: String,
    /// Display name of the user who moved it
    pub user_name: String,
}

/// Defines relationships between `TransferLog` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each log belongs to one budget item
    #[sea_orm(
        belongs_to = "super::budget_plan_item::Entity",
        from = "Column::ItemId",
        to = "super::budget_plan_item::Column::Id"
    )]
    Item,
}

impl Related<super::budget_plan_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
