//! Inventory model: stock movements of supply lots between warehouses.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Resource, ResourceKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    #[validate(range(min = 1))]
    pub id: i64,
    #[validate(range(min = 1))]
    pub supply_lot_id: i64,
    #[validate(range(min = 1))]
    pub warehouse_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<i64>,
    pub movement_type: String,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Resource for StockMovement {
    const KIND: ResourceKind = ResourceKind::Inventory;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StockMovementRequest {
    #[validate(range(min = 1, message = "Supply lot ID is required"))]
    pub supply_lot_id: i64,
    #[validate(range(min = 1, message = "Warehouse ID is required"))]
    pub warehouse_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<i64>,
    #[validate(length(min = 1, message = "Movement type is required"))]
    pub movement_type: String,
    #[validate(range(min = 1.0, message = "Quantity must be at least 1"))]
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Query for the on-hand quantity of a lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OnHandParams {
    #[validate(range(min = 1, message = "Warehouse ID is required"))]
    pub warehouse_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<i64>,
}
