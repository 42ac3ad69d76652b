//! Core business logic - framework-agnostic budget and procurement operations.
//!
//! Store operations take a `&DatabaseConnection`; read helpers are generic over
//! `ConnectionTrait` so they can also run inside a transaction. Reports are
//! pure functions over a [`realization::Snapshot`].

/// Budget plan CRUD and the item helpers shared with transfers
pub mod budget;
/// Evaluation classification and notes
pub mod evaluation;
/// Master data lists and id resolution
pub mod master_data;
/// Id and document number generation
pub mod numbering;
/// Project registry
pub mod project;
/// Purchase request CRUD
pub mod purchase_request;
/// Planned versus realized aggregation
pub mod realization;
/// Plain-text report formatting
pub mod report;
/// Moving items between budget plans
pub mod transfer;
/// User accounts and login
pub mod user;
/// Purchase request approval workflow
pub mod workflow;
