//! Purchase request item entity - One requested line.
//!
//! `budget_plan_item_id` is a soft key: it is not a foreign key because a
//! linked budget item may be transferred (and re-identified) or deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase request item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pr_items")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owning purchase request
    pub pr_id: String,
    /// Order within the request
    pub position: i32,
    /// Master item code
    pub item_id: Option<String>,
    /// Line description
    pub description: String,
    /// Linked budget item
    pub budget_plan_item_id: Option<String>,
    /// Requested quantity
    pub qty: i32,
    /// Unit of measure
    pub uom: String,
    /// Estimated cost per unit
    pub est_cost_unit: f64,
    /// Estimated total cost
    pub est_cost_total: f64,
    /// Currency code
    pub currency: String,
    /// Supplier option id
    pub supplier_id: Option<String>,
    /// Remarks
    pub remarks: Option<String>,
}

/// Defines relationships between `PrItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one purchase request
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
