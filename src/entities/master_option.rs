//! Master option entity - One row per lookup value across every master list.
//!
//! The `list` column names the master data category (`departments`, `ios`, ...).
//! Project options are not stored here; they are projected from the project registry.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Master option database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "master_options")]
pub struct Model {
    /// Unique identifier of the option
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Master data category key this option belongs to
    pub list: String,
    /// Short code (e.g. `IO-1001`)
    pub code: String,
    /// Human-readable name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Optional parent grouping
    pub category: Option<String>,
    /// Unit of measure for master items
    pub uom: Option<String>,
    /// Whether the option is offered for new records
    pub is_active: Option<bool>,
}

/// Master options have no relationships; references to them are soft keys
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
