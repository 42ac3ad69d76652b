//! Evaluation of budget items against their realization.

use crate::{
    core::realization::{Snapshot, realized_amount, utilization_percent},
    entities::budget_plan_item,
    errors::{Error, Result},
};
use sea_orm::{NotSet, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::fmt;
use tracing::info;

/// How completely a budget item has been realized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EvaluationStatus {
    /// More than 100% realized
    Over,
    /// Between 90% and 100% realized
    Full,
    /// Below 90% realized
    #[serde(rename = "Not Full")]
    NotFull,
}

impl EvaluationStatus {
    /// Classifies a utilization percentage.
    #[must_use]
    pub fn classify(utilization: f64) -> Self {
        if utilization > 100.0 {
            Self::Over
        } else if utilization >= 90.0 {
            Self::Full
        } else {
            Self::NotFull
        }
    }

    /// Only items that are not yet fully realized take an obstacle note.
    #[must_use]
    pub const fn accepts_obstacle(self) -> bool {
        matches!(self, Self::NotFull)
    }

    /// Display string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Over => "Over",
            Self::Full => "Full",
            Self::NotFull => "Not Full",
        }
    }
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One budget item on the evaluation page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct EvaluationRow {
    pub plan_id: String,
    pub plan_number: String,
    pub item_id: String,
    pub machine_name: String,
    pub plan_cost: f64,
    pub realized: f64,
    pub utilization: f64,
    pub status: EvaluationStatus,
    pub obstacle: Option<String>,
    pub difference_reason: Option<String>,
}

/// Classifies every budget item, in plan order then item order.
#[must_use]
pub fn evaluation_report(snapshot: &Snapshot) -> Vec<EvaluationRow> {
    snapshot
        .budgets
        .iter()
        .flat_map(|plan| plan.items.iter().map(move |item| (plan, item)))
        .map(|(plan, item)| {
            let realized = realized_amount(snapshot, &item.id);
            let utilization = utilization_percent(item.estimation_cost_total, realized);
            EvaluationRow {
                plan_id: plan.id.clone(),
                plan_number: plan.plan_number.clone(),
                item_id: item.id.clone(),
                machine_name: item.machine_name.clone(),
                plan_cost: item.estimation_cost_total,
                realized,
                utilization,
                status: EvaluationStatus::classify(utilization),
                obstacle: item.evaluation_obstacle.clone(),
                difference_reason: item.evaluation_difference_reason.clone(),
            }
        })
        .collect()
}

/// Notes entered for one item on the evaluation page.
#[derive(Debug, Clone, Default)]
pub struct EvaluationEntry {
    /// Budget item the notes belong to
    pub item_id: String,
    /// Why the item is not fully realized
    pub obstacle: Option<String>,
    /// Why request details differ from the plan
    pub difference_reason: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Writes evaluation notes back onto the items of one plan.
///
/// Both notes of every listed item are replaced; blank text clears a note.
/// Items that are already Full or Over keep their stored obstacle: a new one
/// is rejected, and so is an item that does not belong to the plan. Nothing is written unless every
/// entry is valid.
pub async fn save_evaluation(
    db: &DatabaseConnection,
    plan_id: &str,
    entries: Vec<EvaluationEntry>,
) -> Result<()> {
    let txn = db.begin().await?;
    let snapshot = Snapshot::load(&txn).await?;
    let plan = snapshot
        .budgets
        .iter()
        .find(|plan| plan.id == plan_id)
        .ok_or_else(|| Error::not_found("Budget plan", plan_id))?;

    let count = entries.len();
    for entry in entries {
        let item = plan
            .item(&entry.item_id)
            .ok_or_else(|| Error::not_found("Budget item", &entry.item_id))?;

        let obstacle = non_blank(entry.obstacle);
        let realized = realized_amount(&snapshot, &item.id);
        let status =
            EvaluationStatus::classify(utilization_percent(item.estimation_cost_total, realized));
        let evaluation_obstacle = if status.accepts_obstacle() {
            Set(obstacle)
        } else if obstacle.is_none() || obstacle == item.evaluation_obstacle {
            NotSet
        } else {
            return Err(Error::validation(format!(
                "'{}' is {status}; obstacles are only recorded for items that are Not Full.",
                item.machine_name
            )));
        };

        budget_plan_item::ActiveModel {
            id: Set(item.id.clone()),
            evaluation_obstacle,
            evaluation_difference_reason: Set(non_blank(entry.difference_reason)),
            ..Default::default()
        }
        .update(&txn)
        .await?;
    }
    txn.commit().await?;

    info!("Saved evaluation of {} item(s) in plan {}", count, plan.plan_number);
    Ok(())
}
