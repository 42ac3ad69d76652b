//! Shared test utilities for capex-flow.
//!
//! This module provides common helper functions for setting up test databases
//! and building domain records with sensible defaults.

use crate::{
    core::{numbering, user},
    errors::Result,
    models::{
        BudgetPlan, BudgetPlanItem, InvestmentType, MasterOption, PrItem, Process, Project,
        ProjectSchedule, ProjectStatus, PurchaseRequest, User, UserRole, WorkflowStatus,
    },
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a user account without storing it.
///
/// # Defaults
/// * `password`: "123"
/// * `name`: "Test <username>"
/// * `email`: "<username>@example.com"
/// * `department`: "Engineering"
pub fn test_user(id: &str, username: &str, role: UserRole) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        password: "123".to_string(),
        name: format!("Test {username}"),
        email: format!("{username}@example.com"),
        role,
        department: "Engineering".to_string(),
    }
}

/// Stores a user built by [`test_user`].
pub async fn create_test_user(
    db: &DatabaseConnection,
    id: &str,
    username: &str,
    role: UserRole,
) -> Result<User> {
    let account = test_user(id, username, role);
    user::insert_user(db, &account).await?;
    Ok(account)
}

/// Builds a master option with only id, code and name set.
pub fn sample_option(id: &str, code: &str, name: &str) -> MasterOption {
    MasterOption {
        id: id.to_string(),
        code: code.to_string(),
        name: name.to_string(),
        description: None,
        category: None,
        uom: None,
        is_active: None,
    }
}

/// Builds an unsaved project named "Test" for customer "Acme".
///
/// The id is blank so create assigns one; there are no milestones and no
/// budget allocation.
pub fn sample_project(code: &str) -> Project {
    Project {
        id: String::new(),
        code: code.to_string(),
        name: "Test".to_string(),
        customer: "Acme".to_string(),
        model: String::new(),
        description: None,
        year: "2024".to_string(),
        project_manager: None,
        budget_allocation: None,
        status: ProjectStatus::Draft,
        schedule: ProjectSchedule::default(),
        custom_milestones: Vec::new(),
    }
}

/// Builds a budget item with a fresh id and `total = qty * unit_cost`.
pub fn sample_item(name: &str, qty: i32, unit_cost: f64, fiscal_year: i32) -> BudgetPlanItem {
    BudgetPlanItem {
        id: numbering::new_id("bpi"),
        internal_no: numbering::internal_no(),
        machine_name: name.to_string(),
        process: Process::Preparation,
        brand: None,
        qty,
        uom: "Unit".to_string(),
        currency: "IDR".to_string(),
        estimation_cost_unit: unit_cost,
        estimation_cost_total: f64::from(qty) * unit_cost,
        description: None,
        fiscal_year,
        evaluation_obstacle: None,
        evaluation_difference_reason: None,
        transfers: Vec::new(),
    }
}

/// Builds a Draft budget plan for 2024-2025.
///
/// # Defaults
/// * `department_id`: "dept1"
/// * `project_id`: "prj1"
/// * `cost_center`: "cc1"
/// * `plant_id`: "pl1"
pub fn sample_budget(
    id: &str,
    io_no: &str,
    business_category_id: &str,
    items: Vec<BudgetPlanItem>,
) -> BudgetPlan {
    BudgetPlan {
        id: id.to_string(),
        plan_number: format!("BP-2024-{id}"),
        start_year: 2024,
        end_year: 2025,
        department_id: "dept1".to_string(),
        business_category_id: business_category_id.to_string(),
        project_id: "prj1".to_string(),
        io_no: io_no.to_string(),
        cost_center: "cc1".to_string(),
        plant_id: "pl1".to_string(),
        pic: "John Doe".to_string(),
        investment_type: InvestmentType::Capex,
        description: None,
        status: WorkflowStatus::Draft,
        items,
        created_at: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default(),
    }
}

/// Builds a request line, optionally linked to a budget item.
pub fn sample_pr_item(budget_item_id: Option<&str>, qty: i32, unit_cost: f64) -> PrItem {
    PrItem {
        id: numbering::new_id("pri"),
        item_id: None,
        description: "Test item".to_string(),
        budget_plan_item_id: budget_item_id.map(str::to_string),
        qty,
        uom: "Unit".to_string(),
        est_cost_unit: unit_cost,
        est_cost_total: f64::from(qty) * unit_cost,
        currency: "IDR".to_string(),
        supplier_id: None,
        remarks: None,
    }
}

/// Builds a Draft purchase request dated 2024-03-01 against io1 / cc1.
pub fn sample_purchase_request(
    id: &str,
    business_category_id: &str,
    items: Vec<PrItem>,
) -> PurchaseRequest {
    PurchaseRequest {
        id: id.to_string(),
        pr_number: format!("PR-2403-{id}"),
        pr_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default(),
        department_id: "dept1".to_string(),
        business_category_id: business_category_id.to_string(),
        io_no: "io1".to_string(),
        cost_center: "cc1".to_string(),
        asset_no: None,
        plant_id: "pl1".to_string(),
        pic: "John Doe".to_string(),
        investment_type: Some(InvestmentType::Capex),
        status: WorkflowStatus::Draft,
        items,
        history: Vec::new(),
    }
}
