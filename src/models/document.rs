//! Knowledge-base document model.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Resource, ResourceKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Document {
    #[validate(range(min = 1))]
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Resource for Document {
    const KIND: ResourceKind = ResourceKind::Document;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Request to create or update a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DocumentRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}
