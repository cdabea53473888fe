//! Field log model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{PageParams, Resource, ResourceKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FieldLog {
    #[validate(range(min = 1))]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_name: Option<String>,
    pub log_date: NaiveDate,
    #[validate(length(max = 100))]
    pub log_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Resource for FieldLog {
    const KIND: ResourceKind = ResourceKind::FieldLog;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct FieldLogListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub log_type: Option<String>,
    #[serde(flatten)]
    #[validate(nested)]
    pub paging: PageParams,
}

/// Request to create or update a field log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FieldLogRequest {
    pub log_date: NaiveDate,
    #[validate(length(min = 1, max = 100, message = "Log type is required"))]
    pub log_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
}
