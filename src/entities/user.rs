//! User entity - Accounts that can log in and act on the workflow.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Login name
    pub username: String,
    /// Plaintext password
    pub password: String,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Role: `"Admin"`, `"User"`, `"Approver"` or `"Finance"`
    pub role: String,
    /// Department name
    pub department: String,
}

/// `User` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
