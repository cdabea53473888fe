//! Query identities.
//!
//! A key is a path of segments. `[kind]` covers everything of one resource type,
//! `[kind, "list", ...]` every list, `[kind, "detail", id]` one item. Invalidation and
//! snapshots select entries by prefix.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::errors::ClientError;
use crate::models::ResourceKind;

/// Freshness window for most lists and details.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
/// Freshness window for on-hand stock.
pub const ON_HAND_TTL: Duration = Duration::from_secs(2 * 60);
/// Freshness window for AI suggestions.
pub const AI_SUGGESTIONS_TTL: Duration = Duration::from_secs(10 * 60);
/// Freshness window for AI yield prediction and cost optimization.
pub const AI_ANALYSIS_TTL: Duration = Duration::from_secs(30 * 60);

const LIST: &str = "list";
const DETAIL: &str = "detail";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Extend the key with one more segment.
    pub fn push(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }

    /// Extend the key with serialized parameters.
    ///
    /// Parameters are rendered as JSON with sorted object keys, so equal field values
    /// always yield the same identity.
    pub fn with_params<P: Serialize>(self, params: &P) -> Result<Self, ClientError> {
        let value = serde_json::to_value(params)?;
        Ok(self.push(value.to_string()))
    }

    /// Every entry of one resource type.
    pub fn all(kind: ResourceKind) -> Self {
        QueryKey(vec![kind.as_str().to_string()])
    }

    /// Every list of one resource type, scoped or not.
    pub fn lists(kind: ResourceKind) -> Self {
        Self::all(kind).push(LIST)
    }

    /// One unscoped list with its filters.
    pub fn list<P: Serialize>(kind: ResourceKind, params: &P) -> Result<Self, ClientError> {
        Self::lists(kind).with_params(params)
    }

    /// Every list of `kind` scoped under one parent, e.g. the plots of farm 7.
    pub fn scoped_lists(kind: ResourceKind, parent: ResourceKind, parent_id: i64) -> Self {
        Self::lists(kind)
            .push(parent.as_str())
            .push(parent_id.to_string())
    }

    /// One scoped list with its filters.
    pub fn scoped_list<P: Serialize>(
        kind: ResourceKind,
        parent: ResourceKind,
        parent_id: i64,
        params: &P,
    ) -> Result<Self, ClientError> {
        Self::scoped_lists(kind, parent, parent_id).with_params(params)
    }

    /// Every detail entry of one resource type.
    pub fn details(kind: ResourceKind) -> Self {
        Self::all(kind).push(DETAIL)
    }

    pub fn detail(kind: ResourceKind, id: i64) -> Self {
        Self::details(kind).push(id.to_string())
    }

    pub fn is_list(&self) -> bool {
        self.0.get(1).map(String::as_str) == Some(LIST)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}
