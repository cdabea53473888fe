//! Harvest model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{PageParams, Resource, ResourceKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Harvest {
    #[validate(range(min = 1))]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_name: Option<String>,
    pub harvest_date: NaiveDate,
    #[validate(range(exclusive_min = 0.0))]
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Resource for Harvest {
    const KIND: ResourceKind = ResourceKind::Harvest;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Date-range filter shared by the season-scoped ledgers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct DateRangeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(flatten)]
    #[validate(nested)]
    pub paging: PageParams,
}

/// Request to create or update a harvest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HarvestRequest {
    pub harvest_date: NaiveDate,
    #[validate(range(exclusive_min = 0.0, message = "Quantity must be positive"))]
    pub quantity: f64,
    pub unit: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
