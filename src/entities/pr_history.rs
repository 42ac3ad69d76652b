//! Purchase request history entity - Append-only audit trail.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase request history database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pr_history")]
pub struct Model {
    /// Unique identifier, increasing with insertion order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning purchase request
    pub pr_id: String,
    /// When the entry was written
    pub date: DateTimeUtc,
    /// Display name of the acting user
    pub user_name: String,
    /// What happened (e.g. `"Changed status to Approved"`)
    pub action: String,
    /// Free-text notes, empty when none were given
    pub notes: String,
}

/// Defines relationships between `PrHistory` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one purchase request
    #[sea_orm(
        belongs_to = "super::purchase_request::Entity",
        from = "Column::PrId",
        to = "super::purchase_request::Column::Id"
    )]
    PurchaseRequest,
}

impl Related<super::purchase_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
