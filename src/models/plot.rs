//! Plot model.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Resource, ResourceKind};

/// A plot of land, optionally belonging to a farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Plot {
    #[validate(range(min = 1))]
    pub id: i64,
    #[validate(length(min = 1))]
    pub plot_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(exclusive_min = 0.0))]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Resource for Plot {
    const KIND: ResourceKind = ResourceKind::Plot;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Request to create or update a plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlotRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[validate(length(min = 1, message = "Plot name is required"))]
    pub plot_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(exclusive_min = 0.0, message = "Area must be a positive number"))]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soil_type_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_status_id: Option<i64>,
}

impl PlotRequest {
    pub fn named(plot_name: impl Into<String>) -> Self {
        Self {
            user_id: None,
            plot_name: plot_name.into(),
            address_id: None,
            area: None,
            soil_type_id: None,
            plot_status_id: None,
        }
    }
}
