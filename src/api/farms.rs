//! Farm endpoints.

use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{Farm, FarmCreateRequest, FarmDetail, FarmListParams, FarmUpdateRequest, Page};

/// GET /api/v1/farms - List the signed-in farmer's farms.
pub async fn list_farms(
    client: &ApiClient,
    params: &FarmListParams,
) -> Result<Page<Farm>, ClientError> {
    client.get_page("/farms", params).await
}

/// GET /api/v1/farms/:id - Get a farm with its plot summary.
pub async fn get_farm(client: &ApiClient, id: i64) -> Result<FarmDetail, ClientError> {
    client.get(&format!("/farms/{}", id)).await
}

/// POST /api/v1/farms - Create a farm.
pub async fn create_farm(
    client: &ApiClient,
    request: &FarmCreateRequest,
) -> Result<FarmDetail, ClientError> {
    client.post("/farms", request).await
}

/// PUT /api/v1/farms/:id - Update a farm.
pub async fn update_farm(
    client: &ApiClient,
    id: i64,
    request: &FarmUpdateRequest,
) -> Result<FarmDetail, ClientError> {
    client.put(&format!("/farms/{}", id), request).await
}

/// DELETE /api/v1/farms/:id - Delete (deactivate) a farm.
pub async fn delete_farm(client: &ApiClient, id: i64) -> Result<(), ClientError> {
    client.delete(&format!("/farms/{}", id)).await
}

/// PATCH /api/v1/farms/:id/restore - Reactivate a deleted farm.
pub async fn restore_farm(client: &ApiClient, id: i64) -> Result<FarmDetail, ClientError> {
    client.patch_empty(&format!("/farms/{}/restore", id)).await
}
