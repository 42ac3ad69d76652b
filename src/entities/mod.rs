//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities are the flattened table rows behind the domain records in
//! `models`. Child rows carry a `position` or autoincrement id so the
//! embedded lists keep their insertion order.

pub mod budget_plan;
pub mod budget_plan_item;
pub mod master_option;
pub mod pr_history;
pub mod pr_item;
pub mod project;
pub mod project_milestone;
pub mod purchase_request;
pub mod transfer_log;
pub mod user;

// Re-export specific types to avoid conflicts
pub use budget_plan::{Column as BudgetPlanColumn, Entity as BudgetPlan, Model as BudgetPlanModel};
pub use budget_plan_item::{
    Column as BudgetPlanItemColumn, Entity as BudgetPlanItem, Model as BudgetPlanItemModel,
};
pub use master_option::{
    Column as MasterOptionColumn, Entity as MasterOption, Model as MasterOptionModel,
};
pub use pr_history::{Column as PrHistoryColumn, Entity as PrHistory, Model as PrHistoryModel};
pub use pr_item::{Column as PrItemColumn, Entity as PrItem, Model as PrItemModel};
pub use project::{Column as ProjectColumn, Entity as Project, Model as ProjectModel};
pub use project_milestone::{
    Column as ProjectMilestoneColumn, Entity as ProjectMilestone, Model as ProjectMilestoneModel,
};
pub use purchase_request::{
    Column as PurchaseRequestColumn, Entity as PurchaseRequest, Model as PurchaseRequestModel,
};
pub use transfer_log::{
    Column as TransferLogColumn, Entity as TransferLog, Model as TransferLogModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
