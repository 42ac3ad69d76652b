//! Realization business logic - planned versus actual spend.
//!
//! Every figure here is re-derived from a [`Snapshot`] of the store; nothing is
//! cached or indexed. A purchase request item realizes a budget item only
//! through its `budget_plan_item_id`, and only while the owning request is in a
//! realized status (Approved, On Process or Closed).

use crate::{
    core::{
        budget::list_budgets, master_data::MasterLookup, project::list_projects,
        purchase_request::list_purchase_requests,
    },
    errors::Result,
    models::{
        BudgetPlan, BudgetPlanItem, MasterDataCategory, PrItem, Project, ProjectStatus,
        PurchaseRequest, WorkflowStatus,
    },
};
use chrono::NaiveDate;
use sea_orm::ConnectionTrait;
use serde::Serialize;

/// Everything the reports read, loaded in one go.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// All budget plans with their items
    pub budgets: Vec<BudgetPlan>,
    /// All purchase requests with their items and history
    pub purchase_requests: Vec<PurchaseRequest>,
    /// The project registry
    pub projects: Vec<Project>,
    /// Every master list, for resolving ids to codes and names
    pub master: MasterLookup,
}

impl Snapshot {
    /// Loads the current state of the store.
    pub async fn load<C>(conn: &C) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        Ok(Self {
            budgets: list_budgets(conn).await?,
            purchase_requests: list_purchase_requests(conn).await?,
            projects: list_projects(conn).await?,
            master: MasterLookup::load(conn).await?,
        })
    }

    /// Finds a budget item by id across all plans; the first match wins.
    #[must_use]
    pub fn find_item(&self, item_id: &str) -> Option<(&BudgetPlan, &BudgetPlanItem)> {
        self.budgets
            .iter()
            .find_map(|plan| plan.item(item_id).map(|item| (plan, item)))
    }

    /// Every purchase request line linked to `item_id`, whatever its request's status.
    pub fn linked_lines<'a>(
        &'a self,
        item_id: &'a str,
    ) -> impl Iterator<Item = (&'a PurchaseRequest, &'a PrItem)> + 'a {
        self.purchase_requests.iter().flat_map(move |request| {
            request
                .items
                .iter()
                .filter(move |line| line.budget_plan_item_id.as_deref() == Some(item_id))
                .map(move |line| (request, line))
        })
    }
}

/// Sum of linked line totals from requests in a realized status.
#[must_use]
pub fn realized_amount(snapshot: &Snapshot, item_id: &str) -> f64 {
    snapshot
        .linked_lines(item_id)
        .filter(|(request, _)| request.status.is_realized())
        .map(|(_, line)| line.est_cost_total)
        .sum()
}

/// What is left of the plan; negative when overspent.
#[must_use]
pub fn balance(planned: f64, realized: f64) -> f64 {
    planned - realized
}

/// Calculates how much of the plan has been realized, as a percentage.
///
/// Not clamped: overspending yields more than 100. A zero plan yields 0.
#[must_use]
pub fn utilization_percent(planned: f64, realized: f64) -> f64 {
    if planned == 0.0 {
        return 0.0;
    }

    (realized / planned) * 100.0
}

/// A purchase request line shown under a realization row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedRequest {
    /// Request number
    pub pr_number: String,
    /// Request date
    pub date: NaiveDate,
    /// Line description
    pub item_name: String,
    /// Line total
    pub amount: f64,
    /// Current status of the request
    pub status: WorkflowStatus,
}

/// One budget item in the realization report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct RealizationRow {
    pub item_id: String,
    pub plan_id: String,
    pub plan_number: String,
    pub io_number: String,
    pub cost_center: String,
    pub machine_name: String,
    pub project_name: String,
    pub department_name: String,
    pub fiscal_year: i32,
    pub total_plan_cost: f64,
    pub realized_amount: f64,
    pub balance: f64,
    pub percentage_used: f64,
    /// Lines of any status; only realized ones count towards `realized_amount`
    pub linked_requests: Vec<LinkedRequest>,
}

/// Grand totals of a realization report.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[allow(missing_docs)]
pub struct RealizationTotals {
    pub plan: f64,
    pub realized: f64,
    pub balance: f64,
    pub percentage: f64,
}

/// Rows in plan order, then item order, plus their totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealizationReport {
    /// One row per budget item
    pub rows: Vec<RealizationRow>,
    /// Sums over all rows
    pub totals: RealizationTotals,
}

/// Builds the realization report over every budget item.
#[must_use]
pub fn realization_report(snapshot: &Snapshot) -> RealizationReport {
    let master = &snapshot.master;
    let mut rows = Vec::new();

    for plan in &snapshot.budgets {
        let io_number = master.code_of(MasterDataCategory::Ios, &plan.io_no);
        let cost_center = master.code_of(MasterDataCategory::CostCenters, &plan.cost_center);
        let project_name = master.name_of(MasterDataCategory::Projects, &plan.project_id);
        let department_name = master.name_of(MasterDataCategory::Departments, &plan.department_id);

        for item in &plan.items {
            let linked_requests: Vec<LinkedRequest> = snapshot
                .linked_lines(&item.id)
                .map(|(request, line)| LinkedRequest {
                    pr_number: request.pr_number.clone(),
                    date: request.pr_date,
                    item_name: line.description.clone(),
                    amount: line.est_cost_total,
                    status: request.status,
                })
                .collect();
            let realized = realized_amount(snapshot, &item.id);

            rows.push(RealizationRow {
                item_id: item.id.clone(),
                plan_id: plan.id.clone(),
                plan_number: plan.plan_number.clone(),
                io_number: io_number.to_string(),
                cost_center: cost_center.to_string(),
                machine_name: item.machine_name.clone(),
                project_name: project_name.to_string(),
                department_name: department_name.to_string(),
                fiscal_year: item.fiscal_year,
                total_plan_cost: item.estimation_cost_total,
                realized_amount: realized,
                balance: balance(item.estimation_cost_total, realized),
                percentage_used: utilization_percent(item.estimation_cost_total, realized),
                linked_requests,
            });
        }
    }

    let plan: f64 = rows.iter().map(|row| row.total_plan_cost).sum();
    let realized: f64 = rows.iter().map(|row| row.realized_amount).sum();
    let totals = RealizationTotals {
        plan,
        realized,
        balance: balance(plan, realized),
        percentage: utilization_percent(plan, realized),
    };

    RealizationReport { rows, totals }
}

/// Which business category a realized amount is credited to in the yearly summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryAttribution {
    /// The category of the purchase request that spent the money.
    #[default]
    Requester,
    /// The category of the budget plan that owns the linked item.
    Plan,
}

/// Budget and realization of one business category in one fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    /// Category option id
    pub category_id: String,
    /// Category code, used as the chart label
    pub name: String,
    /// Planned cost of the year's items in plans of this category
    pub budget: f64,
    /// Realized spend on the year's items credited to this category
    pub realization: f64,
}

/// Per-category budget versus realization for fiscal year `year`.
///
/// Budget is always credited to the owning plan's category. Realization
/// follows `attribution`. Lines without a budget link, or linked to an item
/// that no longer exists, are ignored. Categories that are not in the master
/// list are not reported.
#[must_use]
pub fn category_year_summary(
    snapshot: &Snapshot,
    year: i32,
    attribution: CategoryAttribution,
) -> Vec<CategorySummary> {
    let mut summary: Vec<CategorySummary> = snapshot
        .master
        .options(MasterDataCategory::Categories)
        .iter()
        .map(|category| CategorySummary {
            category_id: category.id.clone(),
            name: category.code.clone(),
            budget: 0.0,
            realization: 0.0,
        })
        .collect();

    let mut credit = |category_id: &str, budget: f64, realization: f64| {
        if let Some(entry) = summary.iter_mut().find(|e| e.category_id == category_id) {
            entry.budget += budget;
            entry.realization += realization;
        }
    };

    for plan in &snapshot.budgets {
        let planned: f64 = plan
            .items
            .iter()
            .filter(|item| item.fiscal_year == year)
            .map(|item| item.estimation_cost_total)
            .sum();
        credit(plan.business_category_id.as_str(), planned, 0.0);
    }

    for request in snapshot
        .purchase_requests
        .iter()
        .filter(|request| request.status.is_realized())
    {
        for line in &request.items {
            let Some(linked_id) = line.budget_plan_item_id.as_deref() else {
                continue;
            };
            let Some((plan, item)) = snapshot.find_item(linked_id) else {
                continue;
            };
            if item.fiscal_year != year {
                continue;
            }
            let category_id = match attribution {
                CategoryAttribution::Requester => request.business_category_id.as_str(),
                CategoryAttribution::Plan => plan.business_category_id.as_str(),
            };
            credit(category_id, 0.0, line.est_cost_total);
        }
    }

    summary
}

/// The `n` projects with the largest budget allocation; a missing allocation counts as 0.
#[must_use]
pub fn top_projects(snapshot: &Snapshot, n: usize) -> Vec<&Project> {
    let mut projects: Vec<&Project> = snapshot.projects.iter().collect();
    projects.sort_by(|a, b| {
        b.budget_allocation
            .unwrap_or(0.0)
            .total_cmp(&a.budget_allocation.unwrap_or(0.0))
    });
    projects.truncate(n);
    projects
}

/// Headline figures for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    /// Planned cost of every item of every plan
    pub total_budget: f64,
    /// Total of every line of every request in a realized status, linked or not
    pub total_realization: f64,
    /// `total_budget - total_realization`
    pub remaining_balance: f64,
    /// Number of requests per status, in lifecycle order
    pub pr_counts: Vec<(WorkflowStatus, usize)>,
    /// Number of projects per status
    pub project_counts: Vec<(ProjectStatus, usize)>,
}

impl DashboardMetrics {
    /// Requests currently in `status`.
    #[must_use]
    pub fn pr_count(&self, status: WorkflowStatus) -> usize {
        self.pr_counts
            .iter()
            .find(|(s, _)| *s == status)
            .map_or(0, |(_, count)| *count)
    }

    /// Projects currently in `status`.
    #[must_use]
    pub fn project_count(&self, status: ProjectStatus) -> usize {
        self.project_counts
            .iter()
            .find(|(s, _)| *s == status)
            .map_or(0, |(_, count)| *count)
    }
}

/// Computes the dashboard headline figures.
#[must_use]
pub fn dashboard_metrics(snapshot: &Snapshot) -> DashboardMetrics {
    let total_budget: f64 = snapshot.budgets.iter().map(BudgetPlan::total_plan_cost).sum();
    let total_realization: f64 = snapshot
        .purchase_requests
        .iter()
        .filter(|request| request.status.is_realized())
        .map(PurchaseRequest::total_cost)
        .sum();

    let pr_counts = WorkflowStatus::ALL
        .into_iter()
        .map(|status| {
            let count = snapshot
                .purchase_requests
                .iter()
                .filter(|request| request.status == status)
                .count();
            (status, count)
        })
        .collect();
    let project_counts = ProjectStatus::ALL
        .into_iter()
        .map(|status| {
            let count = snapshot
                .projects
                .iter()
                .filter(|project| project.status == status)
                .count();
            (status, count)
        })
        .collect();

    DashboardMetrics {
        total_budget,
        total_realization,
        remaining_balance: balance(total_budget, total_realization),
        pr_counts,
        project_counts,
    }
}
