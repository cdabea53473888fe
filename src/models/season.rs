//! Season model: one growing cycle of a crop on a plot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{PageParams, Resource, ResourceKind};

/// Lifecycle state of a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeasonStatus {
    Planned,
    Active,
    Completed,
    Cancelled,
    Archived,
}

impl SeasonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonStatus::Planned => "PLANNED",
            SeasonStatus::Active => "ACTIVE",
            SeasonStatus::Completed => "COMPLETED",
            SeasonStatus::Cancelled => "CANCELLED",
            SeasonStatus::Archived => "ARCHIVED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PLANNED" => Some(SeasonStatus::Planned),
            "ACTIVE" => Some(SeasonStatus::Active),
            "COMPLETED" => Some(SeasonStatus::Completed),
            "CANCELLED" => Some(SeasonStatus::Cancelled),
            "ARCHIVED" => Some(SeasonStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    #[validate(range(min = 1))]
    pub id: i64,
    #[validate(range(min = 1))]
    pub plot_id: i64,
    #[validate(range(min = 1))]
    pub crop_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variety_id: Option<i64>,
    pub season_name: String,
    /// Kept as text; the backend is not consistent between dates and timestamps here.
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_harvest_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SeasonStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub initial_plant_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub current_plant_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_yield_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_yield_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Resource for Season {
    const KIND: ResourceKind = ResourceKind::Season;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Season with the display names the detail endpoint joins in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeasonDetail {
    #[serde(flatten)]
    #[validate(nested)]
    pub season: Season,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variety_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_name: Option<String>,
}

impl Resource for SeasonDetail {
    const KIND: ResourceKind = ResourceKind::Season;

    fn id(&self) -> i64 {
        self.season.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeasonListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SeasonStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(flatten)]
    #[validate(nested)]
    pub paging: PageParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeasonCreateRequest {
    #[validate(range(min = 1, message = "Plot ID is required"))]
    pub plot_id: i64,
    #[validate(range(min = 1, message = "Crop ID is required"))]
    pub crop_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variety_id: Option<i64>,
    #[validate(length(min = 1, message = "Season name is required"))]
    pub season_name: String,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_harvest_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 1, message = "Initial plant count must be at least 1"))]
    pub initial_plant_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_yield_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeasonUpdateRequest {
    #[validate(length(min = 1, message = "Season name is required"))]
    pub season_name: String,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variety_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_harvest_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[validate(range(min = 1, message = "Current plant count must be at least 1"))]
    pub current_plant_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_yield_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_yield_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeasonStatusUpdateRequest {
    pub status: SeasonStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_serializes_dates() {
        let request = SeasonCreateRequest {
            plot_id: 4,
            crop_id: 2,
            variety_id: None,
            season_name: "Spring rice".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            planned_harvest_date: None,
            end_date: None,
            initial_plant_count: 500,
            expected_yield_kg: None,
            notes: None,
        };
        assert!(request.validate().is_ok());

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["startDate"], "2024-03-01");
        assert_eq!(value["initialPlantCount"], 500);

        // The create payload is a valid season once an id is attached.
        let mut draft = value;
        draft["id"] = json!(99);
        let season: Season = serde_json::from_value(draft).unwrap();
        assert!(season.validate().is_ok());
    }

    #[test]
    fn test_zero_plant_count_rejected() {
        let request = SeasonUpdateRequest {
            season_name: "s".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            variety_id: None,
            planned_harvest_date: None,
            end_date: None,
            current_plant_count: 0,
            expected_yield_kg: None,
            actual_yield_kg: None,
            notes: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_status_roundtrip() {
        assert_eq!(SeasonStatus::parse("active"), Some(SeasonStatus::Active));
        assert_eq!(
            serde_json::to_value(SeasonStatus::Cancelled).unwrap(),
            json!("CANCELLED")
        );
    }
}
