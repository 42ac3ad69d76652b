//! Budget plan item entity - One budgeted line of a plan.
//!
//! `estimation_cost_total` is stored as computed at entry time and is never
//! re-derived from `qty` and `estimation_cost_unit`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget plan item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_plan_items")]
pub struct Model {
    /// Globally unique item id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owning plan
    pub plan_id: String,
    /// Order within the plan
    pub position: i32,
    /// Internal reference number
    pub internal_no: String,
    /// Machine or tool name
    pub machine_name: String,
    /// `"Preparation"` or `"Final Assy"`
    pub process: String,
    /// Preferred brand
    pub brand: Option<String>,
    /// Planned quantity
    pub qty: i32,
    /// Unit of measure
    pub uom: String,
    /// Currency code
    pub currency: String,
    /// Estimated cost per unit
    pub estimation_cost_unit: f64,
    /// Estimated total cost
    pub estimation_cost_total: f64,
    /// Optional description
    pub description: Option<String>,
    /// Fiscal year of the spend
    pub fiscal_year: i32,
    /// Obstacle noted during evaluation
    pub evaluation_obstacle: Option<String>,
    /// Reason purchase requests differ from the plan
    pub evaluation_difference_reason: Option<String>,
}

/// Defines relationships between `BudgetPlanItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one plan
    #[sea_orm(
        belongs_to = "super::budget_plan::Entity",
        from = "Column::PlanId",
        to = "super::budget_plan::Column::Id"
    )]
    Plan,
    /// One item has many transfer logs
    #[sea_orm(has_many = "super::transfer_log::Entity")]
    Transfers,
}

impl Related<super::budget_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plan.def()
    }
}

impl Related<super::transfer_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transfers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
