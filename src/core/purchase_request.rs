//! Purchase request business logic - Handles purchase request CRUD.
//!
//! Status and history belong to the workflow engine: create always starts a
//! request as Draft with a `Created` history entry, and update replaces
//! everything except those two. Requests can only be edited while Draft or
//! Rejected, and can only be deleted before they are Approved.

use crate::{
    core::{numbering, workflow},
    entities::{pr_history, pr_item, purchase_request},
    errors::{Error, Result},
    models::{InvestmentType, PrHistoryLog, PrItem, PurchaseRequest, User, WorkflowStatus},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::info;

fn item_from_model(model: pr_item::Model) -> PrItem {
    PrItem {
        id: model.id,
        item_id: model.item_id,
        description: model.description,
        budget_plan_item_id: model.budget_plan_item_id,
        qty: model.qty,
        uom: model.uom,
        est_cost_unit: model.est_cost_unit,
        est_cost_total: model.est_cost_total,
        currency: model.currency,
        supplier_id: model.supplier_id,
        remarks: model.remarks,
    }
}

fn history_from_model(model: pr_history::Model) -> PrHistoryLog {
    PrHistoryLog {
        date: model.date,
        user: model.user_name,
        action: model.action,
        notes: model.notes,
    }
}

fn request_from_model(
    model: purchase_request::Model,
    items: Vec<PrItem>,
    history: Vec<PrHistoryLog>,
) -> Result<PurchaseRequest> {
    Ok(PurchaseRequest {
        status: model.status.parse()?,
        investment_type: model
            .investment_type
            .as_deref()
            .map(str::parse::<InvestmentType>)
            .transpose()?,
        id: model.id,
        pr_number: model.pr_number,
        pr_date: model.pr_date,
        department_id: model.department_id,
        business_category_id: model.business_category_id,
        io_no: model.io_no,
        cost_center: model.cost_center,
        asset_no: model.asset_no,
        plant_id: model.plant_id,
        pic: model.pic,
        items,
        history,
    })
}

async fn assemble<C>(
    conn: &C,
    headers: Vec<purchase_request::Model>,
) -> Result<Vec<PurchaseRequest>>
where
    C: ConnectionTrait,
{
    let ids: Vec<String> = headers.iter().map(|h| h.id.clone()).collect();

    let mut items: HashMap<String, Vec<PrItem>> = HashMap::new();
    for row in pr_item::Entity::find()
        .filter(pr_item::Column::PrId.is_in(ids.clone()))
        .order_by_asc(pr_item::Column::Position)
        .all(conn)
        .await?
    {
        items
            .entry(row.pr_id.clone())
            .or_default()
            .push(item_from_model(row));
    }

    let mut history: HashMap<String, Vec<PrHistoryLog>> = HashMap::new();
    for row in pr_history::Entity::find()
        .filter(pr_history::Column::PrId.is_in(ids))
        .order_by_asc(pr_history::Column::Id)
        .all(conn)
        .await?
    {
        history
            .entry(row.pr_id.clone())
            .or_default()
            .push(history_from_model(row));
    }

    headers
        .into_iter()
        .map(|header| {
            let own_items = items.remove(&header.id).unwrap_or_default();
            let own_history = history.remove(&header.id).unwrap_or_default();
            request_from_model(header, own_items, own_history)
        })
        .collect()
}

/// Retrieves every purchase request, ordered by date then number.
pub async fn list_purchase_requests<C>(conn: &C) -> Result<Vec<PurchaseRequest>>
where
    C: ConnectionTrait,
{
    let headers = purchase_request::Entity::find()
        .order_by_asc(purchase_request::Column::PrDate)
        .order_by_asc(purchase_request::Column::PrNumber)
        .all(conn)
        .await?;
    assemble(conn, headers).await
}

/// Finds a purchase request by id, returning None if it does not exist.
pub async fn get_purchase_request<C>(conn: &C, pr_id: &str) -> Result<Option<PurchaseRequest>>
where
    C: ConnectionTrait,
{
    let Some(header) = purchase_request::Entity::find_by_id(pr_id.to_string())
        .one(conn)
        .await?
    else {
        return Ok(None);
    };
    Ok(assemble(conn, vec![header]).await?.pop())
}

fn header_active_model(request: &PurchaseRequest) -> purchase_request::ActiveModel {
    purchase_request::ActiveModel {
        id: Set(request.id.clone()),
        pr_number: Set(request.pr_number.clone()),
        pr_date: Set(request.pr_date),
        department_id: Set(request.department_id.clone()),
        business_category_id: Set(request.business_category_id.clone()),
        io_no: Set(request.io_no.clone()),
        cost_center: Set(request.cost_center.clone()),
        asset_no: Set(request.asset_no.clone()),
        plant_id: Set(request.plant_id.clone()),
        pic: Set(request.pic.clone()),
        investment_type: Set(request.investment_type.map(|t| t.as_str().to_string())),
        status: Set(request.status.as_str().to_string()),
    }
}

async fn insert_items<C>(conn: &C, request: &PurchaseRequest) -> Result<()>
where
    C: ConnectionTrait,
{
    for (position, item) in (0_i32..).zip(&request.items) {
        pr_item::ActiveModel {
            id: Set(item.id.clone()),
            pr_id: Set(request.id.clone()),
            position: Set(position),
            item_id: Set(item.item_id.clone()),
            description: Set(item.description.clone()),
            budget_plan_item_id: Set(item.budget_plan_item_id.clone()),
            qty: Set(item.qty),
            uom: Set(item.uom.clone()),
            est_cost_unit: Set(item.est_cost_unit),
            est_cost_total: Set(item.est_cost_total),
            currency: Set(item.currency.clone()),
            supplier_id: Set(item.supplier_id.clone()),
            remarks: Set(item.remarks.clone()),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

/// Appends one audit entry to a request's history.
pub(crate) async fn append_history<C>(conn: &C, pr_id: &str, entry: &PrHistoryLog) -> Result<()>
where
    C: ConnectionTrait,
{
    pr_history::ActiveModel {
        pr_id: Set(pr_id.to_string()),
        date: Set(entry.date),
        user_name: Set(entry.user.clone()),
        action: Set(entry.action.clone()),
        notes: Set(entry.notes.clone()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}

/// Inserts a whole request aggregate as given; callers wrap this in a transaction.
pub(crate) async fn insert_purchase_request<C>(conn: &C, request: &PurchaseRequest) -> Result<()>
where
    C: ConnectionTrait,
{
    header_active_model(request).insert(conn).await?;
    insert_items(conn, request).await?;
    for entry in &request.history {
        append_history(conn, &request.id, entry).await?;
    }
    Ok(())
}

fn validate(request: &PurchaseRequest) -> Result<()> {
    if request.department_id.trim().is_empty() || request.io_no.trim().is_empty() {
        return Err(Error::validation("Please fill in required header fields."));
    }
    if request.items.is_empty() {
        return Err(Error::validation(
            "Please add at least one item to the Purchase Request.",
        ));
    }
    Ok(())
}

/// Stores a new purchase request as Draft.
///
/// Blank ids and a blank number are generated; the history is reset to a
/// single `Created` entry written by `actor`.
pub async fn add_purchase_request(
    db: &DatabaseConnection,
    mut request: PurchaseRequest,
    actor: &User,
) -> Result<PurchaseRequest> {
    validate(&request)?;

    if request.id.trim().is_empty() {
        request.id = numbering::new_id("pr");
    }
    if request.pr_number.trim().is_empty() {
        request.pr_number = numbering::pr_number(request.pr_date);
    }
    for item in &mut request.items {
        if item.id.trim().is_empty() {
            item.id = numbering::new_id("pri");
        }
    }
    request.status = WorkflowStatus::Draft;
    request.history = vec![PrHistoryLog {
        date: Utc::now(),
        user: actor.name.clone(),
        action: "Created".to_string(),
        notes: "Initial Draft".to_string(),
    }];

    let txn = db.begin().await?;
    insert_purchase_request(&txn, &request).await?;
    txn.commit().await?;

    info!(
        "Created purchase request {} with {} item(s)",
        request.pr_number,
        request.items.len()
    );
    Ok(request)
}

/// Replaces a Draft or Rejected purchase request, items included.
///
/// The stored status and history are kept; they only change through the workflow.
pub async fn update_purchase_request(
    db: &DatabaseConnection,
    mut request: PurchaseRequest,
) -> Result<PurchaseRequest> {
    validate(&request)?;
    for item in &mut request.items {
        if item.id.trim().is_empty() {
            item.id = numbering::new_id("pri");
        }
    }

    let txn = db.begin().await?;
    let existing = get_purchase_request(&txn, &request.id)
        .await?
        .ok_or_else(|| Error::not_found("Purchase request", &request.id))?;

    if !workflow::is_editable(existing.status) {
        return Err(Error::ReadOnly {
            pr_number: existing.pr_number,
            status: existing.status.to_string(),
        });
    }

    request.status = existing.status;
    request.history = existing.history;

    header_active_model(&request).update(&txn).await?;
    pr_item::Entity::delete_many()
        .filter(pr_item::Column::PrId.eq(request.id.as_str()))
        .exec(&txn)
        .await?;
    insert_items(&txn, &request).await?;
    txn.commit().await?;

    info!("Updated purchase request {}", request.pr_number);
    Ok(request)
}

/// Deletes a purchase request that has not been Approved yet.
pub async fn delete_purchase_request(db: &DatabaseConnection, pr_id: &str) -> Result<()> {
    let txn = db.begin().await?;
    let existing = purchase_request::Entity::find_by_id(pr_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Purchase request", pr_id))?;

    let status: WorkflowStatus = existing.status.parse()?;
    if !workflow::can_delete(status) {
        return Err(Error::DeleteLocked {
            pr_number: existing.pr_number,
            status: status.to_string(),
        });
    }

    pr_item::Entity::delete_many()
        .filter(pr_item::Column::PrId.eq(pr_id))
        .exec(&txn)
        .await?;
    pr_history::Entity::delete_many()
        .filter(pr_history::Column::PrId.eq(pr_id))
        .exec(&txn)
        .await?;
    purchase_request::Entity::delete_by_id(pr_id.to_string())
        .exec(&txn)
        .await?;
    txn.commit().await?;

    info!("Deleted purchase request {}", existing.pr_number);
    Ok(())
}

/// Moves a request along the workflow; see [`workflow::transition_purchase_request`].
pub async fn update_pr_status(
    db: &DatabaseConnection,
    pr_id: &str,
    target: WorkflowStatus,
    note: Option<&str>,
    actor: &User,
) -> Result<PurchaseRequest> {
    workflow::transition_purchase_request(db, pr_id, target, note, actor).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::models::UserRole;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_add_purchase_request_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let requester = test_user("u2", "user", UserRole::User);

        let empty = sample_purchase_request("", "cat1", vec![]);
        let result = add_purchase_request(&db, empty, &requester).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut no_io = sample_purchase_request("", "cat1", vec![sample_pr_item(None, 1, 10.0)]);
        no_io.io_no = String::new();
        let result = add_purchase_request(&db, no_io, &requester).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_purchase_request_starts_as_draft_with_history() -> Result<()> {
        let db = setup_test_db().await?;
        let requester = test_user("u2", "user", UserRole::User);

        let mut request =
            sample_purchase_request("", "cat1", vec![sample_pr_item(Some("bpi1"), 2, 230.0)]);
        request.status = WorkflowStatus::Approved;
        request.pr_number = String::new();

        let created = add_purchase_request(&db, request, &requester).await?;
        assert_eq!(created.status, WorkflowStatus::Draft);
        assert!(created.pr_number.starts_with("PR-"));

        let stored = get_purchase_request(&db, &created.id).await?.unwrap();
        assert_eq!(stored.status, WorkflowStatus::Draft);
        assert_eq!(stored.history.len(), 1);
        assert_eq!(stored.history[0].action, "Created");
        assert_eq!(stored.history[0].notes, "Initial Draft");
        assert_eq!(stored.history[0].user, requester.name);
        assert_eq!(stored.total_cost(), 460.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_keeps_status_and_history() -> Result<()> {
        let db = setup_test_db().await?;
        let requester = test_user("u2", "user", UserRole::User);
        let created = add_purchase_request(
            &db,
            sample_purchase_request("pr1", "cat1", vec![sample_pr_item(None, 1, 10.0)]),
            &requester,
        )
        .await?;

        let mut edit = created.clone();
        edit.status = WorkflowStatus::Closed;
        edit.history.clear();
        edit.items = vec![
            sample_pr_item(None, 1, 10.0),
            sample_pr_item(None, 3, 5.0),
        ];
        update_purchase_request(&db, edit).await?;

        let stored = get_purchase_request(&db, "pr1").await?.unwrap();
        assert_eq!(stored.status, WorkflowStatus::Draft);
        assert_eq!(stored.history.len(), 1);
        assert_eq!(stored.items.len(), 2);
        assert_eq!(stored.total_cost(), 25.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_submitted_request_is_read_only() -> Result<()> {
        let db = setup_test_db().await?;
        let requester = test_user("u2", "user", UserRole::User);
        let created = add_purchase_request(
            &db,
            sample_purchase_request("pr1", "cat1", vec![sample_pr_item(None, 1, 10.0)]),
            &requester,
        )
        .await?;
        update_pr_status(&db, "pr1", WorkflowStatus::Submitted, None, &requester).await?;

        let result = update_purchase_request(&db, created).await;
        assert!(matches!(result, Err(Error::ReadOnly { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_is_locked_once_approved() -> Result<()> {
        let db = setup_test_db().await?;
        let requester = test_user("u2", "user", UserRole::User);
        let approver = test_user("u3", "approver", UserRole::Approver);

        add_purchase_request(
            &db,
            sample_purchase_request("pr1", "cat1", vec![sample_pr_item(None, 1, 10.0)]),
            &requester,
        )
        .await?;
        update_pr_status(&db, "pr1", WorkflowStatus::Submitted, None, &requester).await?;
        update_pr_status(&db, "pr1", WorkflowStatus::Approved, None, &approver).await?;

        let result = delete_purchase_request(&db, "pr1").await;
        assert!(matches!(result, Err(Error::DeleteLocked { .. })));
        assert!(get_purchase_request(&db, "pr1").await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_draft_request() -> Result<()> {
        let db = setup_test_db().await?;
        let requester = test_user("u2", "user", UserRole::User);
        add_purchase_request(
            &db,
            sample_purchase_request("pr1", "cat1", vec![sample_pr_item(None, 1, 10.0)]),
            &requester,
        )
        .await?;

        delete_purchase_request(&db, "pr1").await?;

        assert!(get_purchase_request(&db, "pr1").await?.is_none());
        assert!(list_purchase_requests(&db).await?.is_empty());
        Ok(())
    }
}
