//! Budget plan business logic - Handles budget plan CRUD.
//!
//! A plan is stored as a header row, its item rows and each item's transfer
//! log rows. Every write replaces the whole aggregate inside one database
//! transaction, so readers never observe a plan with half of its items.

use crate::{
    core::numbering,
    entities::{budget_plan, budget_plan_item, transfer_log},
    errors::{Error, Result},
    models::{BudgetPlan, BudgetPlanItem, TransferLog, WorkflowStatus},
};
use chrono::{Datelike, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info};

fn transfer_from_model(model: transfer_log::Model) -> TransferLog {
    TransferLog {
        date: model.date,
        from_plan_id: model.from_plan_id,
        from_io_no: model.from_io_no,
        to_plan_id: model.to_plan_id,
        to_io_no: model.to_io_no,
        reason: model.reason,
        user: model.user_name,
    }
}

fn item_from_model(
    model: budget_plan_item::Model,
    transfers: Vec<TransferLog>,
) -> Result<BudgetPlanItem> {
    Ok(BudgetPlanItem {
        process: model.process.parse()?,
        id: model.id,
        internal_no: model.internal_no,
        machine_name: model.machine_name,
        brand: model.brand,
        qty: model.qty,
        uom: model.uom,
        currency: model.currency,
        estimation_cost_unit: model.estimation_cost_unit,
        estimation_cost_total: model.estimation_cost_total,
        description: model.description,
        fiscal_year: model.fiscal_year,
        evaluation_obstacle: model.evaluation_obstacle,
        evaluation_difference_reason: model.evaluation_difference_reason,
        transfers,
    })
}

fn plan_from_model(model: budget_plan::Model, items: Vec<BudgetPlanItem>) -> Result<BudgetPlan> {
    Ok(BudgetPlan {
        investment_type: model.investment_type.parse()?,
        status: model.status.parse()?,
        id: model.id,
        plan_number: model.plan_number,
        start_year: model.start_year,
        end_year: model.end_year,
        department_id: model.department_id,
        business_category_id: model.business_category_id,
        project_id: model.project_id,
        io_no: model.io_no,
        cost_center: model.cost_center,
        plant_id: model.plant_id,
        pic: model.pic,
        description: model.description,
        items,
        created_at: model.created_at,
    })
}

/// Assembles full plans from header rows, loading their items and transfer trails.
async fn assemble<C>(conn: &C, headers: Vec<budget_plan::Model>) -> Result<Vec<BudgetPlan>>
where
    C: ConnectionTrait,
{
    let plan_ids: Vec<String> = headers.iter().map(|h| h.id.clone()).collect();
    let item_rows = budget_plan_item::Entity::find()
        .filter(budget_plan_item::Column::PlanId.is_in(plan_ids))
        .order_by_asc(budget_plan_item::Column::Position)
        .all(conn)
        .await?;

    let item_ids: Vec<String> = item_rows.iter().map(|i| i.id.clone()).collect();
    let mut transfers: HashMap<String, Vec<TransferLog>> = HashMap::new();
    for log in transfer_log::Entity::find()
        .filter(transfer_log::Column::ItemId.is_in(item_ids))
        .order_by_asc(transfer_log::Column::Id)
        .all(conn)
        .await?
    {
        transfers
            .entry(log.item_id.clone())
            .or_default()
            .push(transfer_from_model(log));
    }

    let mut items: HashMap<String, Vec<BudgetPlanItem>> = HashMap::new();
    for row in item_rows {
        let plan_id = row.plan_id.clone();
        let trail = transfers.remove(&row.id).unwrap_or_default();
        items
            .entry(plan_id)
            .or_default()
            .push(item_from_model(row, trail)?);
    }

    headers
        .into_iter()
        .map(|header| {
            let own = items.remove(&header.id).unwrap_or_default();
            plan_from_model(header, own)
        })
        .collect()
}

/// Retrieves every budget plan with items, ordered by creation date then plan number.
pub async fn list_budgets<C>(conn: &C) -> Result<Vec<BudgetPlan>>
where
    C: ConnectionTrait,
{
    let headers = budget_plan::Entity::find()
        .order_by_asc(budget_plan::Column::CreatedAt)
        .order_by_asc(budget_plan::Column::PlanNumber)
        .all(conn)
        .await?;
    assemble(conn, headers).await
}

/// Finds a budget plan by id, returning None if it does not exist.
pub async fn get_budget<C>(conn: &C, plan_id: &str) -> Result<Option<BudgetPlan>>
where
    C: ConnectionTrait,
{
    let Some(header) = budget_plan::Entity::find_by_id(plan_id.to_string())
        .one(conn)
        .await?
    else {
        return Ok(None);
    };
    Ok(assemble(conn, vec![header]).await?.pop())
}

/// Approved plans a purchase request may link its items to.
///
/// When the request already names an IO or cost centre, only plans with the
/// same IO / cost centre are offered.
pub async fn available_budgets_for<C>(
    conn: &C,
    io_no: Option<&str>,
    cost_center: Option<&str>,
) -> Result<Vec<BudgetPlan>>
where
    C: ConnectionTrait,
{
    let mut query = budget_plan::Entity::find()
        .filter(budget_plan::Column::Status.eq(WorkflowStatus::Approved.as_str()));
    if let Some(io_no) = io_no.filter(|s| !s.is_empty()) {
        query = query.filter(budget_plan::Column::IoNo.eq(io_no));
    }
    if let Some(cost_center) = cost_center.filter(|s| !s.is_empty()) {
        query = query.filter(budget_plan::Column::CostCenter.eq(cost_center));
    }
    let headers = query
        .order_by_asc(budget_plan::Column::PlanNumber)
        .all(conn)
        .await?;
    assemble(conn, headers).await
}

/// Inserts one item row and its transfer trail under `plan_id`.
pub(crate) async fn insert_item<C>(
    conn: &C,
    plan_id: &str,
    position: i32,
    item: &BudgetPlanItem,
) -> Result<()>
where
    C: ConnectionTrait,
{
    budget_plan_item::ActiveModel {
        id: Set(item.id.clone()),
        plan_id: Set(plan_id.to_string()),
        position: Set(position),
        internal_no: Set(item.internal_no.clone()),
        machine_name: Set(item.machine_name.clone()),
        process: Set(item.process.as_str().to_string()),
        brand: Set(item.brand.clone()),
        qty: Set(item.qty),
        uom: Set(item.uom.clone()),
        currency: Set(item.currency.clone()),
        estimation_cost_unit: Set(item.estimation_cost_unit),
        estimation_cost_total: Set(item.estimation_cost_total),
        description: Set(item.description.clone()),
        fiscal_year: Set(item.fiscal_year),
        evaluation_obstacle: Set(item.evaluation_obstacle.clone()),
        evaluation_difference_reason: Set(item.evaluation_difference_reason.clone()),
    }
    .insert(conn)
    .await?;

    for log in &item.transfers {
        transfer_log::ActiveModel {
            item_id: Set(item.id.clone()),
            date: Set(log.date),
            from_plan_id: Set(log.from_plan_id.clone()),
            from_io_no: Set(log.from_io_no.clone()),
            to_plan_id: Set(log.to_plan_id.clone()),
            to_io_no: Set(log.to_io_no.clone()),
            reason: Set(log.reason.clone()),
            user_name: Set(log.user.clone()),
            ..Default::default()
        }
        .insert(conn)
        .await?;
    }

    Ok(())
}

/// Deletes one item row together with its transfer trail.
pub(crate) async fn delete_item<C>(conn: &C, item_id: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    transfer_log::Entity::delete_many()
        .filter(transfer_log::Column::ItemId.eq(item_id))
        .exec(conn)
        .await?;
    budget_plan_item::Entity::delete_by_id(item_id.to_string())
        .exec(conn)
        .await?;
    Ok(())
}

/// Next free item position of a plan.
pub(crate) async fn next_position<C>(conn: &C, plan_id: &str) -> Result<i32>
where
    C: ConnectionTrait,
{
    let last = budget_plan_item::Entity::find()
        .filter(budget_plan_item::Column::PlanId.eq(plan_id))
        .order_by_desc(budget_plan_item::Column::Position)
        .one(conn)
        .await?;
    Ok(last.map_or(0, |item| item.position + 1))
}

fn header_active_model(plan: &BudgetPlan) -> budget_plan::ActiveModel {
    budget_plan::ActiveModel {
        id: Set(plan.id.clone()),
        plan_number: Set(plan.plan_number.clone()),
        start_year: Set(plan.start_year),
        end_year: Set(plan.end_year),
        department_id: Set(plan.department_id.clone()),
        business_category_id: Set(plan.business_category_id.clone()),
        project_id: Set(plan.project_id.clone()),
        io_no: Set(plan.io_no.clone()),
        cost_center: Set(plan.cost_center.clone()),
        plant_id: Set(plan.plant_id.clone()),
        pic: Set(plan.pic.clone()),
        investment_type: Set(plan.investment_type.as_str().to_string()),
        description: Set(plan.description.clone()),
        status: Set(plan.status.as_str().to_string()),
        created_at: Set(plan.created_at),
    }
}

/// Inserts a whole plan aggregate; callers wrap this in a transaction.
pub(crate) async fn insert_budget<C>(conn: &C, plan: &BudgetPlan) -> Result<()>
where
    C: ConnectionTrait,
{
    header_active_model(plan).insert(conn).await?;
    for (position, item) in (0_i32..).zip(&plan.items) {
        insert_item(conn, &plan.id, position, item).await?;
    }
    Ok(())
}

async fn delete_budget_rows<C>(conn: &C, plan_id: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let item_ids: Vec<String> = budget_plan_item::Entity::find()
        .filter(budget_plan_item::Column::PlanId.eq(plan_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|item| item.id)
        .collect();

    transfer_log::Entity::delete_many()
        .filter(transfer_log::Column::ItemId.is_in(item_ids))
        .exec(conn)
        .await?;
    budget_plan_item::Entity::delete_many()
        .filter(budget_plan_item::Column::PlanId.eq(plan_id))
        .exec(conn)
        .await?;
    budget_plan::Entity::delete_by_id(plan_id.to_string())
        .exec(conn)
        .await?;
    Ok(())
}

fn validate_header(plan: &BudgetPlan) -> Result<()> {
    if plan.department_id.trim().is_empty()
        || plan.project_id.trim().is_empty()
        || plan.io_no.trim().is_empty()
    {
        return Err(Error::validation(
            "Department, Project, and IO Number are required.",
        ));
    }
    if plan.end_year < plan.start_year {
        return Err(Error::validation("End year cannot be before start year."));
    }
    Ok(())
}

/// Stores a new budget plan.
///
/// Blank plan and item ids are generated, a blank plan number becomes
/// `BP-<current year>-<nnnn>`, and the creation date is set to today.
pub async fn add_budget(db: &DatabaseConnection, mut plan: BudgetPlan) -> Result<BudgetPlan> {
    validate_header(&plan)?;

    let today = Utc::now().date_naive();
    if plan.id.trim().is_empty() {
        plan.id = numbering::new_id("bp");
    }
    if plan.plan_number.trim().is_empty() {
        plan.plan_number = numbering::plan_number(today.year());
    }
    for item in &mut plan.items {
        if item.id.trim().is_empty() {
            item.id = numbering::new_id("bpi");
        }
    }
    plan.created_at = today;

    let txn = db.begin().await?;
    insert_budget(&txn, &plan).await?;
    txn.commit().await?;

    info!(
        "Created budget plan {} with {} item(s)",
        plan.plan_number,
        plan.items.len()
    );
    Ok(plan)
}

/// Replaces a stored budget plan, items included, keeping its creation date.
pub async fn update_budget(db: &DatabaseConnection, mut plan: BudgetPlan) -> Result<BudgetPlan> {
    validate_header(&plan)?;
    for item in &mut plan.items {
        if item.id.trim().is_empty() {
            item.id = numbering::new_id("bpi");
        }
    }

    let txn = db.begin().await?;
    let existing = budget_plan::Entity::find_by_id(plan.id.clone())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Budget plan", &plan.id))?;
    plan.created_at = existing.created_at;

    delete_budget_rows(&txn, &plan.id).await?;
    insert_budget(&txn, &plan).await?;
    txn.commit().await?;

    info!("Updated budget plan {}", plan.plan_number);
    Ok(plan)
}

/// Deletes a budget plan with all of its items.
///
/// Purchase request items linked to the deleted items keep their (now dangling) link.
pub async fn delete_budget(db: &DatabaseConnection, plan_id: &str) -> Result<()> {
    let txn = db.begin().await?;
    let existing = budget_plan::Entity::find_by_id(plan_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Budget plan", plan_id))?;

    delete_budget_rows(&txn, plan_id).await?;
    txn.commit().await?;

    info!("Deleted budget plan {}", existing.plan_number);
    Ok(())
}

/// Sets the status of a budget plan. Plans have no enforced state machine.
pub async fn set_budget_status(
    db: &DatabaseConnection,
    plan_id: &str,
    status: WorkflowStatus,
) -> Result<()> {
    let existing = budget_plan::Entity::find_by_id(plan_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Budget plan", plan_id))?;

    debug!(
        "Budget plan {} status {} -> {}",
        existing.plan_number, existing.status, status
    );
    let mut active: budget_plan::ActiveModel = existing.into();
    active.status = Set(status.as_str().to_string());
    active.update(db).await?;
    Ok(())
}
