//! Purchase request entity - Header of a purchase request.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase request database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_requests")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Human-readable number (`PR-<yyyymm>-<nnnn>`)
    pub pr_number: String,
    /// Request date
    pub pr_date: Date,
    /// Department option id
    pub department_id: String,
    /// Business category option id
    pub business_category_id: String,
    /// IO number option id
    pub io_no: String,
    /// Cost centre option id
    pub cost_center: String,
    /// Asset number
    pub asset_no: Option<String>,
    /// Plant option id
    pub plant_id: String,
    /// Person in charge
    pub pic: String,
    /// `"Capex"` or `"Opex"`
    pub investment_type: Option<String>,
    /// Workflow status display string
    pub status: String,
}

/// Defines relationships between `PurchaseRequest` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One request has many items
    #[sea_orm(has_many = "super::pr_item::Entity")]
    Items,
    /// One request has many history entries
    #[sea_orm(has_many = "super::pr_history::Entity")]
    History,
}

impl Related<super::pr_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::pr_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
