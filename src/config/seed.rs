//! Seed data loading from seed.toml
//!
//! The store starts empty; on startup the binary fills it from a TOML file
//! holding users, master data, projects, budget plans and purchase requests.
//! The `projects` master list is not part of the file because it is derived
//! from the project registry.

use crate::{
    core::{budget, master_data, project, purchase_request, user},
    entities,
    errors::{Error, Result},
    models::{BudgetPlan, MasterDataCategory, MasterOption, Project, PurchaseRequest, User},
};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, TransactionTrait};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Seed file used when `SEED_PATH` is not set.
pub const DEFAULT_SEED_PATH: &str = "seed.toml";

/// The stored master lists, one field per list.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct MasterDataSeed {
    pub departments: Vec<MasterOption>,
    pub categories: Vec<MasterOption>,
    pub ios: Vec<MasterOption>,
    pub cost_centers: Vec<MasterOption>,
    pub plants: Vec<MasterOption>,
    pub suppliers: Vec<MasterOption>,
    pub items: Vec<MasterOption>,
    pub currencies: Vec<MasterOption>,
}

impl MasterDataSeed {
    /// Every list paired with its category.
    #[must_use]
    pub fn lists(&self) -> [(MasterDataCategory, &[MasterOption]); 8] {
        [
            (MasterDataCategory::Departments, self.departments.as_slice()),
            (MasterDataCategory::Categories, self.categories.as_slice()),
            (MasterDataCategory::Ios, self.ios.as_slice()),
            (MasterDataCategory::CostCenters, self.cost_centers.as_slice()),
            (MasterDataCategory::Plants, self.plants.as_slice()),
            (MasterDataCategory::Suppliers, self.suppliers.as_slice()),
            (MasterDataCategory::Items, self.items.as_slice()),
            (MasterDataCategory::Currencies, self.currencies.as_slice()),
        ]
    }
}

/// Structure representing the entire seed.toml file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedData {
    /// User accounts
    pub users: Vec<User>,
    /// Master lists
    pub master_data: MasterDataSeed,
    /// Project registry
    pub projects: Vec<Project>,
    /// Budget plans with their items
    pub budgets: Vec<BudgetPlan>,
    /// Purchase requests with their items and history
    pub purchase_requests: Vec<PurchaseRequest>,
}

/// Gets the seed file path from the `SEED_PATH` environment variable or returns the default.
#[must_use]
pub fn get_seed_path() -> String {
    std::env::var("SEED_PATH").unwrap_or_else(|_| DEFAULT_SEED_PATH.to_string())
}

/// Parses seed data from TOML text.
pub fn parse_seed(contents: &str) -> Result<SeedData> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed data: {e}"),
    })
}

/// Loads seed data from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing or an enum value is not recognised
pub fn load_seed<P: AsRef<Path>>(path: P) -> Result<SeedData> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read seed file {}: {e}", path.as_ref().display()),
    })?;

    parse_seed(&contents)
}

/// Inserts all seed data in one transaction, exactly as given.
pub async fn seed_database(db: &DatabaseConnection, seed: &SeedData) -> Result<()> {
    let txn = db.begin().await?;

    for account in &seed.users {
        user::insert_user(&txn, account).await?;
    }
    for (category, options) in seed.master_data.lists() {
        for option in options {
            master_data::insert_option(&txn, category, option).await?;
        }
    }
    for registered in &seed.projects {
        project::insert_project(&txn, registered).await?;
    }
    for plan in &seed.budgets {
        budget::insert_budget(&txn, plan).await?;
    }
    for request in &seed.purchase_requests {
        purchase_request::insert_purchase_request(&txn, request).await?;
    }

    txn.commit().await?;

    info!(
        "Seeded {} user(s), {} project(s), {} budget plan(s), {} purchase request(s)",
        seed.users.len(),
        seed.projects.len(),
        seed.budgets.len(),
        seed.purchase_requests.len()
    );
    Ok(())
}

/// Seeds the store unless it already holds user accounts. Returns whether it seeded.
pub async fn seed_if_empty(db: &DatabaseConnection, seed: &SeedData) -> Result<bool> {
    let existing = entities::User::find().count(db).await?;
    if existing > 0 {
        info!("Store already holds {} user(s); skipping seed", existing);
        return Ok(false);
    }

    seed_database(db, seed).await?;
    Ok(true)
}
