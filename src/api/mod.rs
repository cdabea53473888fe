//! REST API module.
//!
//! One function per backend operation, grouped by resource. All of them go through
//! [`ApiClient`], which validates, authenticates and decodes.

mod http;

pub mod ai;
pub mod auth;
pub mod documents;
pub mod expenses;
pub mod farms;
pub mod field_logs;
pub mod harvests;
pub mod incidents;
pub mod inventory;
pub mod plots;
pub mod reports;
pub mod seasons;
pub mod tasks;
pub mod varieties;

pub use http::ApiClient;
pub(crate) use http::read_payload;
