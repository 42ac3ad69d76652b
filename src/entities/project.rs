//! Project entity - The project registry, including the fixed schedule dates.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Project database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    /// Unique identifier, shared with the `projects` master option projection
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Project code (e.g. `P-2024-01`)
    pub code: String,
    /// Project name
    pub name: String,
    /// Customer the project is for
    pub customer: String,
    /// Product model
    pub model: String,
    /// Optional description
    pub description: Option<String>,
    /// Project year
    pub year: String,
    /// Responsible project manager
    pub project_manager: Option<String>,
    /// Allocated budget
    pub budget_allocation: Option<f64>,
    /// Status: `"Draft"`, `"Active"`, `"Hold"` or `"Completed"`
    pub status: String,
    /// Die go milestone
    pub die_go: Option<Date>,
    /// T0 milestone
    pub t0: Option<Date>,
    /// PP1 milestone
    pub pp1: Option<Date>,
    /// PP2 milestone
    pub pp2: Option<Date>,
    /// PP3 milestone
    pub pp3: Option<Date>,
    /// Mass production milestone
    pub mass_pro: Option<Date>,
}

/// Defines relationships between Project and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One project has many custom milestones
    #[sea_orm(has_many = "super::project_milestone::Entity")]
    Milestones,
}

impl Related<super::project_milestone::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Milestones.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
