//! Project milestone entity - User-defined milestones, ordered by `position`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Project milestone database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_milestones")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owning project
    pub project_id: String,
    /// Order within the project's milestone list
    pub position: i32,
    /// Milestone name
    pub name: String,
    /// Planned date
    pub date: Date,
    /// Whether the milestone has been reached
    pub is_completed: bool,
}

/// Defines relationships between `ProjectMilestone` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each milestone belongs to one project
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
