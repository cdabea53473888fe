//! Crop variety model.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Resource, ResourceKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Variety {
    #[validate(range(min = 1))]
    pub id: i64,
    #[validate(range(min = 1))]
    pub crop_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_name: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource for Variety {
    const KIND: ResourceKind = ResourceKind::Variety;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Request to create or update a variety.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VarietyRequest {
    #[validate(range(min = 1, message = "Crop ID is required"))]
    pub crop_id: i64,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_needs_crop_and_name() {
        let mut request = VarietyRequest {
            crop_id: 2,
            name: "IR64".to_string(),
            description: None,
        };
        assert!(request.validate().is_ok());

        request.crop_id = 0;
        assert!(request.validate().is_err());

        request.crop_id = 2;
        request.name.clear();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_decode_with_crop_name() {
        let variety: Variety = serde_json::from_value(serde_json::json!({
            "id": 5,
            "cropId": 2,
            "cropName": "Rice",
            "name": "IR64"
        }))
        .unwrap();
        assert_eq!(variety.crop_name.as_deref(), Some("Rice"));
        assert!(variety.validate().is_ok());
    }
}
