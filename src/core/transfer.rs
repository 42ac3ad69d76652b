//! Moving a budget item from one plan to another.
//!
//! The moved item is re-identified so that ids never collide across plans,
//! and it carries its whole transfer trail along, one [`TransferLog`] per move.
//! Removal from the source and insertion into the target happen in a single
//! database transaction.

use crate::{
    core::{
        budget::{delete_item, get_budget, insert_item, next_position},
        master_data::MasterLookup,
        numbering,
    },
    errors::{Error, Result},
    models::{BudgetPlanItem, MasterDataCategory, TransferLog, User},
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;

/// What to move and why.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Plan currently holding the item
    pub source_plan_id: String,
    /// Item to move
    pub item_id: String,
    /// Plan receiving the item
    pub target_plan_id: String,
    /// Justification recorded in the transfer log (required)
    pub reason: String,
}

/// Moves one item between plans, returning the item as it now exists in the target.
pub async fn transfer_budget_item(
    db: &DatabaseConnection,
    request: TransferRequest,
    actor: &User,
) -> Result<BudgetPlanItem> {
    let reason = request.reason.trim();
    if reason.is_empty() {
        return Err(Error::validation("Please provide a reason for the transfer."));
    }
    if request.target_plan_id.trim().is_empty() {
        return Err(Error::validation("Please select a target budget."));
    }
    if request.target_plan_id == request.source_plan_id {
        return Err(Error::validation(
            "Target budget must differ from the source budget.",
        ));
    }

    let txn = db.begin().await?;

    let source = get_budget(&txn, &request.source_plan_id)
        .await?
        .ok_or_else(|| Error::not_found("Budget plan", &request.source_plan_id))?;
    let item = source
        .item(&request.item_id)
        .cloned()
        .ok_or_else(|| Error::not_found("Budget item", &request.item_id))?;
    let target = get_budget(&txn, &request.target_plan_id)
        .await?
        .ok_or_else(|| Error::not_found("Budget plan", &request.target_plan_id))?;

    let master = MasterLookup::load(&txn).await?;
    let log = TransferLog {
        date: Utc::now(),
        from_plan_id: source.id.clone(),
        from_io_no: master.code_of(MasterDataCategory::Ios, &source.io_no).to_string(),
        to_plan_id: target.id.clone(),
        to_io_no: master.code_of(MasterDataCategory::Ios, &target.io_no).to_string(),
        reason: reason.to_string(),
        user: actor.name.clone(),
    };

    let mut moved = item.clone();
    moved.id = numbering::new_id("bpi");
    moved.transfers.push(log);

    delete_item(&txn, &item.id).await?;
    let position = next_position(&txn, &target.id).await?;
    insert_item(&txn, &target.id, position, &moved).await?;
    txn.commit().await?;

    info!(
        "{} transferred '{}' from {} to {} (new id {})",
        actor.username, moved.machine_name, source.plan_number, target.plan_number, moved.id
    );
    Ok(moved)
}
