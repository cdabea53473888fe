//! Crop variety endpoints.

use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{Variety, VarietyRequest};

/// GET /api/v1/varieties/by-crop/:cropId - List the varieties of a crop.
pub async fn list_varieties(client: &ApiClient, crop_id: i64) -> Result<Vec<Variety>, ClientError> {
    client
        .get_list(&format!("/varieties/by-crop/{}", crop_id))
        .await
}

/// GET /api/v1/varieties/:id - Get a variety.
pub async fn get_variety(client: &ApiClient, id: i64) -> Result<Variety, ClientError> {
    client.get(&format!("/varieties/{}", id)).await
}

/// POST /api/v1/varieties - Create a variety.
pub async fn create_variety(
    client: &ApiClient,
    request: &VarietyRequest,
) -> Result<Variety, ClientError> {
    client.post("/varieties", request).await
}

/// PUT /api/v1/varieties/:id - Update a variety.
pub async fn update_variety(
    client: &ApiClient,
    id: i64,
    request: &VarietyRequest,
) -> Result<Variety, ClientError> {
    client.put(&format!("/varieties/{}", id), request).await
}

/// DELETE /api/v1/varieties/:id - Delete a variety.
pub async fn delete_variety(client: &ApiClient, id: i64) -> Result<(), ClientError> {
    client.delete(&format!("/varieties/{}", id)).await
}
