//! Inventory endpoints.

use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{OnHandParams, StockMovement, StockMovementRequest};

/// POST /api/v1/inventory/movements - Record a stock movement.
pub async fn record_movement(
    client: &ApiClient,
    request: &StockMovementRequest,
) -> Result<StockMovement, ClientError> {
    client.post("/inventory/movements", request).await
}

/// GET /api/v1/inventory/lots/:lotId/on-hand - Quantity of a lot on hand in a warehouse.
pub async fn on_hand(
    client: &ApiClient,
    lot_id: i64,
    params: &OnHandParams,
) -> Result<f64, ClientError> {
    client
        .get_scalar(&format!("/inventory/lots/{}/on-hand", lot_id), params)
        .await
}
