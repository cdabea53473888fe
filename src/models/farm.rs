//! Farm model.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{PageParams, Plot, Resource, ResourceKind};

/// A farm owned by the signed-in farmer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    #[validate(range(min = 1))]
    pub id: i64,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_username: Option<String>,
}

impl Resource for Farm {
    const KIND: ResourceKind = ResourceKind::Farm;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Farm detail, including its plots when the backend embeds them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FarmDetail {
    #[serde(flatten)]
    #[validate(nested)]
    pub farm: Farm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub plots: Option<Vec<Plot>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_plots: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_plots: Option<u64>,
}

impl Resource for FarmDetail {
    const KIND: ResourceKind = ResourceKind::Farm;

    fn id(&self) -> i64 {
        self.farm.id
    }
}

/// Filters for `GET /farms`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct FarmListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(flatten)]
    #[validate(nested)]
    pub paging: PageParams,
}

/// Request to create a farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FarmCreateRequest {
    #[validate(length(min = 1, max = 255, message = "Farm name is required"))]
    pub name: String,
    #[validate(range(min = 1))]
    pub province_id: i64,
    #[validate(range(min = 1))]
    pub ward_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(exclusive_min = 0.0, message = "Area must be a positive number"))]
    pub area: Option<f64>,
}

/// Request to update a farm. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FarmUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub province_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub ward_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(exclusive_min = 0.0))]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_validation() {
        let mut request = FarmCreateRequest {
            name: "North Field".to_string(),
            province_id: 1,
            ward_id: 2,
            area: Some(12.5),
        };
        assert!(request.validate().is_ok());

        request.name = String::new();
        assert!(request.validate().is_err());

        request.name = "x".to_string();
        request.area = Some(0.0);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_detail_flattens_farm() {
        let detail: FarmDetail = serde_json::from_value(json!({
            "id": 3,
            "name": "Farm 3",
            "ownerUsername": "farmer1",
            "totalPlots": 2
        }))
        .unwrap();
        assert_eq!(detail.farm.id, 3);
        assert_eq!(detail.farm.owner_username.as_deref(), Some("farmer1"));
        assert_eq!(detail.total_plots, Some(2));
        assert!(detail.validate().is_ok());
    }
}
