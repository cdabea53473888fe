//! Data models for the ACM platform.
//!
//! These models match the backend JSON contract (camelCase) and carry the request and
//! response schemas used to validate traffic in both directions.

mod ai;
mod common;
mod document;
mod expense;
mod farm;
mod field_log;
mod harvest;
mod incident;
mod inventory;
mod plot;
mod report;
mod season;
mod session;
mod task;
mod variety;

pub use ai::*;
pub use common::*;
pub use document::*;
pub use expense::*;
pub use farm::*;
pub use field_log::*;
pub use harvest::*;
pub use incident::*;
pub use inventory::*;
pub use plot::*;
pub use report::*;
pub use season::*;
pub use session::*;
pub use task::*;
pub use variety::*;

use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

/// Resource types known to the client. Each has its own cache namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Farm,
    Plot,
    Season,
    Task,
    Harvest,
    Expense,
    FieldLog,
    Incident,
    Inventory,
    Document,
    Report,
    Variety,
    Ai,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Farm => "farms",
            ResourceKind::Plot => "plots",
            ResourceKind::Season => "seasons",
            ResourceKind::Task => "tasks",
            ResourceKind::Harvest => "harvests",
            ResourceKind::Expense => "expenses",
            ResourceKind::FieldLog => "field-logs",
            ResourceKind::Incident => "incidents",
            ResourceKind::Inventory => "inventory",
            ResourceKind::Document => "documents",
            ResourceKind::Report => "reports",
            ResourceKind::Variety => "varieties",
            ResourceKind::Ai => "ai",
        }
    }
}

/// A server-owned entity with a numeric identity.
pub trait Resource: Serialize + DeserializeOwned + Validate + Clone + Send + Sync + 'static {
    const KIND: ResourceKind;

    fn id(&self) -> i64;
}
