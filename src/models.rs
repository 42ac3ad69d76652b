//! Domain records shared by the store, the workflow and the reports.
//!
//! These are the aggregate shapes callers work with: a budget plan owns its
//! items, an item owns its transfer trail, a purchase request owns its items
//! and history. The `entities` module holds the flattened table rows they are
//! assembled from.

use crate::errors::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Status shared by budget plans and purchase requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowStatus {
    /// Being prepared by the requester
    Draft,
    /// Waiting for an approver
    Submitted,
    /// Approved; counts towards realization
    Approved,
    /// Returned to the requester
    Rejected,
    /// Purchase order in progress
    #[serde(rename = "On Process")]
    OnProcess,
    /// Finished
    Closed,
}

impl WorkflowStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Draft,
        Self::Submitted,
        Self::Approved,
        Self::Rejected,
        Self::OnProcess,
        Self::Closed,
    ];

    /// Display and storage string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Submitted => "Submitted",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::OnProcess => "On Process",
            Self::Closed => "Closed",
        }
    }

    /// Statuses whose linked spend counts as realized.
    #[must_use]
    pub const fn is_realized(self) -> bool {
        matches!(self, Self::Approved | Self::OnProcess | Self::Closed)
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::UnknownValue {
                kind: "workflow status",
                value: s.to_string(),
            })
    }
}

/// Access role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    /// Full access including administration
    Admin,
    /// Requester
    User,
    /// May approve and drive purchase requests
    Approver,
    /// Finance viewer
    Finance,
}

impl UserRole {
    /// Display and storage string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::User => "User",
            Self::Approver => "Approver",
            Self::Finance => "Finance",
        }
    }

    /// Whether this role may approve, reject, process and close requests.
    #[must_use]
    pub const fn can_approve(self) -> bool {
        matches!(self, Self::Admin | Self::Approver)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Admin" => Ok(Self::Admin),
            "User" => Ok(Self::User),
            "Approver" => Ok(Self::Approver),
            "Finance" => Ok(Self::Finance),
            other => Err(Error::UnknownValue {
                kind: "user role",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ProjectStatus {
    Draft,
    Active,
    Hold,
    Completed,
}

impl ProjectStatus {
    /// Every status, in display order.
    pub const ALL: [Self; 4] = [Self::Draft, Self::Active, Self::Hold, Self::Completed];

    /// Display and storage string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Active => "Active",
            Self::Hold => "Hold",
            Self::Completed => "Completed",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::UnknownValue {
                kind: "project status",
                value: s.to_string(),
            })
    }
}

/// Manufacturing process a budgeted machine belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Process {
    #[default]
    Preparation,
    #[serde(rename = "Final Assy")]
    FinalAssy,
}

impl Process {
    /// Display and storage string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preparation => "Preparation",
            Self::FinalAssy => "Final Assy",
        }
    }
}

impl FromStr for Process {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Preparation" => Ok(Self::Preparation),
            "Final Assy" => Ok(Self::FinalAssy),
            other => Err(Error::UnknownValue {
                kind: "process",
                value: other.to_string(),
            }),
        }
    }
}

/// Capital or operational expenditure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum InvestmentType {
    #[default]
    Capex,
    Opex,
}

impl InvestmentType {
    /// Display and storage string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Capex => "Capex",
            Self::Opex => "Opex",
        }
    }
}

impl FromStr for InvestmentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Capex" => Ok(Self::Capex),
            "Opex" => Ok(Self::Opex),
            other => Err(Error::UnknownValue {
                kind: "investment type",
                value: other.to_string(),
            }),
        }
    }
}

/// The lookup lists maintained through the admin screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum MasterDataCategory {
    Departments,
    Categories,
    Ios,
    CostCenters,
    Projects,
    Plants,
    Suppliers,
    Items,
    Currencies,
}

impl MasterDataCategory {
    /// Every list, in admin-tab order.
    pub const ALL: [Self; 9] = [
        Self::Departments,
        Self::Categories,
        Self::Ios,
        Self::CostCenters,
        Self::Projects,
        Self::Plants,
        Self::Suppliers,
        Self::Items,
        Self::Currencies,
    ];

    /// Storage key of the list.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Departments => "departments",
            Self::Categories => "categories",
            Self::Ios => "ios",
            Self::CostCenters => "costCenters",
            Self::Projects => "projects",
            Self::Plants => "plants",
            Self::Suppliers => "suppliers",
            Self::Items => "items",
            Self::Currencies => "currencies",
        }
    }
}

impl fmt::Display for MasterDataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MasterDataCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| Error::UnknownValue {
                kind: "master data category",
                value: s.to_string(),
            })
    }
}

/// Create / update / delete selector for the admin-style manage operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum CrudAction {
    Create,
    Update,
    Delete,
}

/// A lookup record (department, IO number, supplier, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterOption {
    /// Unique identifier
    pub id: String,
    /// Short code shown in reports (e.g. `IO-1001`)
    pub code: String,
    /// Human-readable name
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Parent grouping used for hierarchical filtering
    #[serde(default)]
    pub category: Option<String>,
    /// Unit of measure, used by master items
    #[serde(default)]
    pub uom: Option<String>,
    /// Whether the option is offered for new records
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: String,
    /// Login name, matched case-insensitively
    pub username: String,
    /// Plaintext password, compared verbatim
    pub password: String,
    /// Display name written into audit trails
    pub name: String,
    /// Contact address
    pub email: String,
    /// Access role
    pub role: UserRole,
    /// Department name
    pub department: String,
}

/// Fixed project milestones; any of them may be unscheduled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct ProjectSchedule {
    #[serde(default)]
    pub die_go: Option<NaiveDate>,
    #[serde(default)]
    pub t0: Option<NaiveDate>,
    #[serde(default)]
    pub pp1: Option<NaiveDate>,
    #[serde(default)]
    pub pp2: Option<NaiveDate>,
    #[serde(default)]
    pub pp3: Option<NaiveDate>,
    #[serde(default)]
    pub mass_pro: Option<NaiveDate>,
}

/// A user-defined project milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Milestone {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub is_completed: bool,
}

/// A customer project budgets are raised for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Project {
    pub id: String,
    pub code: String,
    pub name: String,
    pub customer: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub project_manager: Option<String>,
    #[serde(default)]
    pub budget_allocation: Option<f64>,
    pub status: ProjectStatus,
    #[serde(default)]
    pub schedule: ProjectSchedule,
    #[serde(default)]
    pub custom_milestones: Vec<Milestone>,
}

/// Provenance entry written each time a budget item moves to another plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct TransferLog {
    pub date: DateTime<Utc>,
    pub from_plan_id: String,
    pub from_io_no: String,
    pub to_plan_id: String,
    pub to_io_no: String,
    pub reason: String,
    pub user: String,
}

/// One budgeted machine or tool line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetPlanItem {
    /// Globally unique item id; purchase request items link to it
    pub id: String,
    /// Internal reference number
    pub internal_no: String,
    /// What is being bought
    pub machine_name: String,
    /// Process the machine serves
    #[serde(default)]
    pub process: Process,
    /// Preferred brand
    #[serde(default)]
    pub brand: Option<String>,
    /// Planned quantity
    pub qty: i32,
    /// Unit of measure
    pub uom: String,
    /// Currency code of the estimate
    pub currency: String,
    /// Estimated cost per unit
    pub estimation_cost_unit: f64,
    /// `qty * estimation_cost_unit`, fixed when the item is built
    pub estimation_cost_total: f64,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Fiscal year the spend is allocated to
    pub fiscal_year: i32,
    /// Why the item is not yet fully realized
    #[serde(default)]
    pub evaluation_obstacle: Option<String>,
    /// Why purchase request details differ from the plan
    #[serde(default)]
    pub evaluation_difference_reason: Option<String>,
    /// Chain of custody across plans, oldest first
    #[serde(default)]
    pub transfers: Vec<TransferLog>,
}

/// Input for [`BudgetPlanItem::new`].
#[derive(Debug, Clone, Default)]
pub struct BudgetItemDraft {
    /// What is being bought (required)
    pub machine_name: String,
    /// Process the machine serves
    pub process: Process,
    /// Preferred brand
    pub brand: Option<String>,
    /// Planned quantity, defaults to 1
    pub qty: Option<i32>,
    /// Unit of measure, defaults to `Unit`
    pub uom: Option<String>,
    /// Currency code, defaults to `IDR`
    pub currency: Option<String>,
    /// Estimated cost per unit (required, non-zero)
    pub estimation_cost_unit: f64,
    /// Free-text description
    pub description: Option<String>,
    /// Fiscal year of the spend
    pub fiscal_year: i32,
}

impl BudgetPlanItem {
    /// Builds an item from form input, fixing `estimation_cost_total` to
    /// `qty * estimation_cost_unit`.
    pub fn new(draft: BudgetItemDraft) -> Result<Self> {
        let machine_name = draft.machine_name.trim();
        if machine_name.is_empty() || draft.estimation_cost_unit == 0.0 {
            return Err(Error::validation("Machine Name and Cost are required."));
        }
        if !draft.estimation_cost_unit.is_finite() || draft.estimation_cost_unit < 0.0 {
            return Err(Error::validation("Cost must be a positive amount."));
        }
        let qty = draft.qty.unwrap_or(1);
        if qty <= 0 {
            return Err(Error::validation("Quantity must be at least 1."));
        }

        Ok(Self {
            id: crate::core::numbering::new_id("bpi"),
            internal_no: crate::core::numbering::internal_no(),
            machine_name: machine_name.to_string(),
            process: draft.process,
            brand: draft.brand,
            qty,
            uom: draft.uom.unwrap_or_else(|| "Unit".to_string()),
            currency: draft.currency.unwrap_or_else(|| "IDR".to_string()),
            estimation_cost_unit: draft.estimation_cost_unit,
            estimation_cost_total: f64::from(qty) * draft.estimation_cost_unit,
            description: draft.description,
            fiscal_year: draft.fiscal_year,
            evaluation_obstacle: None,
            evaluation_difference_reason: None,
            transfers: Vec::new(),
        })
    }
}

/// An annual investment budget plan with its embedded items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct BudgetPlan {
    pub id: String,
    pub plan_number: String,
    pub start_year: i32,
    pub end_year: i32,
    pub department_id: String,
    pub business_category_id: String,
    pub project_id: String,
    pub io_no: String,
    pub cost_center: String,
    pub plant_id: String,
    #[serde(default)]
    pub pic: String,
    #[serde(default)]
    pub investment_type: InvestmentType,
    #[serde(default)]
    pub description: Option<String>,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub items: Vec<BudgetPlanItem>,
    pub created_at: NaiveDate,
}

impl BudgetPlan {
    /// Sum of every item's planned total.
    #[must_use]
    pub fn total_plan_cost(&self) -> f64 {
        self.items.iter().map(|item| item.estimation_cost_total).sum()
    }

    /// Finds an item of this plan by id.
    #[must_use]
    pub fn item(&self, item_id: &str) -> Option<&BudgetPlanItem> {
        self.items.iter().find(|item| item.id == item_id)
    }
}

/// Audit trail entry of a purchase request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct PrHistoryLog {
    pub date: DateTime<Utc>,
    pub user: String,
    pub action: String,
    #[serde(default)]
    pub notes: String,
}

/// One requested line of a purchase request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrItem {
    /// Unique identifier
    pub id: String,
    /// Master item code
    #[serde(default)]
    pub item_id: Option<String>,
    /// What is being requested
    pub description: String,
    /// Budget item this line realizes; the only join key for realization
    #[serde(default)]
    pub budget_plan_item_id: Option<String>,
    /// Requested quantity
    pub qty: i32,
    /// Unit of measure
    pub uom: String,
    /// Estimated cost per unit
    pub est_cost_unit: f64,
    /// `qty * est_cost_unit`, fixed when the line is built
    pub est_cost_total: f64,
    /// Currency code
    pub currency: String,
    /// Preferred supplier id
    #[serde(default)]
    pub supplier_id: Option<String>,
    /// Free-text remarks
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Input for [`PrItem::new`].
#[derive(Debug, Clone, Default)]
#[allow(missing_docs)]
pub struct PrItemDraft {
    pub item_id: Option<String>,
    pub description: String,
    pub budget_plan_item_id: Option<String>,
    pub qty: Option<i32>,
    pub uom: Option<String>,
    pub est_cost_unit: f64,
    pub currency: Option<String>,
    pub supplier_id: Option<String>,
    pub remarks: Option<String>,
}

impl PrItem {
    /// Builds a request line from form input, fixing `est_cost_total`.
    pub fn new(draft: PrItemDraft) -> Result<Self> {
        let description = draft.description.trim();
        if description.is_empty() || draft.est_cost_unit == 0.0 {
            return Err(Error::validation("Item Description and Cost are required!"));
        }
        if !draft.est_cost_unit.is_finite() || draft.est_cost_unit < 0.0 {
            return Err(Error::validation("Cost must be a positive amount."));
        }
        let qty = draft.qty.unwrap_or(1);
        if qty <= 0 {
            return Err(Error::validation("Quantity must be at least 1."));
        }

        Ok(Self {
            id: crate::core::numbering::new_id("pri"),
            item_id: draft.item_id,
            description: description.to_string(),
            budget_plan_item_id: draft.budget_plan_item_id.filter(|id| !id.is_empty()),
            qty,
            uom: draft.uom.unwrap_or_else(|| "Unit".to_string()),
            est_cost_unit: draft.est_cost_unit,
            est_cost_total: f64::from(qty) * draft.est_cost_unit,
            currency: draft.currency.unwrap_or_else(|| "IDR".to_string()),
            supplier_id: draft.supplier_id,
            remarks: draft.remarks,
        })
    }
}

/// A purchase request raised against one or more budget items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct PurchaseRequest {
    pub id: String,
    pub pr_number: String,
    pub pr_date: NaiveDate,
    pub department_id: String,
    pub business_category_id: String,
    pub io_no: String,
    pub cost_center: String,
    #[serde(default)]
    pub asset_no: Option<String>,
    pub plant_id: String,
    #[serde(default)]
    pub pic: String,
    #[serde(default)]
    pub investment_type: Option<InvestmentType>,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub items: Vec<PrItem>,
    #[serde(default)]
    pub history: Vec<PrHistoryLog>,
}

impl PurchaseRequest {
    /// Sum of every line's total.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.items.iter().map(|item| item.est_cost_total).sum()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_workflow_status_round_trips_display_strings() {
        assert_eq!(WorkflowStatus::OnProcess.as_str(), "On Process");
        assert_eq!(
            "On Process".parse::<WorkflowStatus>().unwrap(),
            WorkflowStatus::OnProcess
        );
        assert!(matches!(
            "Pending".parse::<WorkflowStatus>(),
            Err(Error::UnknownValue { .. })
        ));
    }

    #[test]
    fn test_realized_statuses() {
        let realized: Vec<_> = WorkflowStatus::ALL
            .into_iter()
            .filter(|status| status.is_realized())
            .collect();
        assert_eq!(
            realized,
            vec![
                WorkflowStatus::Approved,
                WorkflowStatus::OnProcess,
                WorkflowStatus::Closed
            ]
        );
    }

    #[test]
    fn test_budget_item_total_is_qty_times_unit_cost() {
        let item = BudgetPlanItem::new(BudgetItemDraft {
            machine_name: "Auto Crimping Machine".to_string(),
            qty: Some(3),
            estimation_cost_unit: 250.5,
            fiscal_year: 2024,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(item.estimation_cost_total, 751.5);
        assert_eq!(item.uom, "Unit");
        assert_eq!(item.currency, "IDR");
        assert!(item.id.starts_with("bpi-"));
        assert!(item.transfers.is_empty());
    }

    #[test]
    fn test_budget_item_defaults_quantity_to_one() {
        let item = BudgetPlanItem::new(BudgetItemDraft {
            machine_name: "Conveyor".to_string(),
            estimation_cost_unit: 300.0,
            fiscal_year: 2025,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(item.qty, 1);
        assert_eq!(item.estimation_cost_total, 300.0);
    }

    #[test]
    fn test_budget_item_requires_name_and_cost() {
        let missing_name = BudgetPlanItem::new(BudgetItemDraft {
            machine_name: "  ".to_string(),
            estimation_cost_unit: 10.0,
            ..Default::default()
        });
        assert!(matches!(missing_name, Err(Error::Validation { .. })));

        let missing_cost = BudgetPlanItem::new(BudgetItemDraft {
            machine_name: "Press".to_string(),
            ..Default::default()
        });
        assert!(matches!(missing_cost, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_pr_item_total_and_blank_link() {
        let item = PrItem::new(PrItemDraft {
            description: "Battery Tester".to_string(),
            budget_plan_item_id: Some(String::new()),
            qty: Some(2),
            est_cost_unit: 230.0,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(item.est_cost_total, 460.0);
        assert!(item.budget_plan_item_id.is_none());
    }

    #[test]
    fn test_master_data_category_keys() {
        assert_eq!(MasterDataCategory::CostCenters.as_str(), "costCenters");
        assert_eq!(
            "ios".parse::<MasterDataCategory>().unwrap(),
            MasterDataCategory::Ios
        );
    }
}
