//! Database configuration module for capex-flow.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! The default URL is an in-memory database, so all state lives for the lifetime of the
//! process and is rebuilt from the seed file on every start. Pointing `DATABASE_URL` at a
//! file keeps the same schema on disk. Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust structs.

use crate::entities::{
    BudgetPlan, BudgetPlanItem, MasterOption, PrHistory, PrItem, Project, ProjectMilestone,
    PurchaseRequest, TransferLog, User,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::debug;

/// Connection string used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";

/// Gets the database URL from environment variable or returns the in-memory default.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to an in-memory `SQLite` database if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables from the entity definitions.
///
/// Parents are created before children so the foreign keys declared by the
/// `belongs_to` relations resolve. Existing tables are left alone.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statements = [
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(MasterOption),
        schema.create_table_from_entity(Project),
        schema.create_table_from_entity(ProjectMilestone),
        schema.create_table_from_entity(BudgetPlan),
        schema.create_table_from_entity(BudgetPlanItem),
        schema.create_table_from_entity(TransferLog),
        schema.create_table_from_entity(PurchaseRequest),
        schema.create_table_from_entity(PrItem),
        schema.create_table_from_entity(PrHistory),
    ];

    for statement in &mut statements {
        statement.if_not_exists();
        db.execute(builder.build(&*statement)).await?;
    }

    Ok(())
}
