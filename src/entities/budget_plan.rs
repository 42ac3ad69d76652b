//! Budget plan entity - Header of an annual investment budget plan.
//!
//! Items live in `budget_plan_items`. Department, category, IO, cost centre,
//! plant and project are soft references into master data.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget plan header database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_plans")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Human-readable number (`BP-<year>-<nnnn>`)
    pub plan_number: String,
    /// First fiscal year covered
    pub start_year: i32,
    /// Last fiscal year covered
    pub end_year: i32,
    /// Department option id
    pub department_id: String,
    /// Business category option id
    pub business_category_id: String,
    /// Project id
    pub project_id: String,
    /// IO number option id
    pub io_no: String,
    /// Cost centre option id
    pub cost_center: String,
    /// Plant option id
    pub plant_id: String,
    /// Person in charge
    pub pic: String,
    /// `"Capex"` or `"Opex"`
    pub investment_type: String,
    /// Optional description
    pub description: Option<String>,
    /// Workflow status display string
    pub status: String,
    /// Creation date
    pub created_at: Date,
}

/// Defines relationships between `BudgetPlan` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One plan has many items
    #[sea_orm(has_many = "super::budget_plan_item::Entity")]
    Items,
}

impl Related<super::budget_plan_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
