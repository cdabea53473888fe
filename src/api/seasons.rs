//! Season endpoints.

use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{
    Page, Season, SeasonCreateRequest, SeasonDetail, SeasonListParams, SeasonStatusUpdateRequest,
    SeasonUpdateRequest,
};

/// GET /api/v1/seasons - List seasons, filtered by plot, crop, status and date range.
pub async fn list_seasons(
    client: &ApiClient,
    params: &SeasonListParams,
) -> Result<Page<Season>, ClientError> {
    client.get_page("/seasons", params).await
}

/// GET /api/v1/seasons/:id - Get a season with crop, variety and plot names.
pub async fn get_season(client: &ApiClient, id: i64) -> Result<SeasonDetail, ClientError> {
    client.get(&format!("/seasons/{}", id)).await
}

/// POST /api/v1/seasons - Plan a season.
pub async fn create_season(
    client: &ApiClient,
    request: &SeasonCreateRequest,
) -> Result<SeasonDetail, ClientError> {
    client.post("/seasons", request).await
}

/// PUT /api/v1/seasons/:id - Update a season.
pub async fn update_season(
    client: &ApiClient,
    id: i64,
    request: &SeasonUpdateRequest,
) -> Result<SeasonDetail, ClientError> {
    client.put(&format!("/seasons/{}", id), request).await
}

/// PATCH /api/v1/seasons/:id/status - Move a season through its lifecycle.
pub async fn update_season_status(
    client: &ApiClient,
    id: i64,
    request: &SeasonStatusUpdateRequest,
) -> Result<SeasonDetail, ClientError> {
    client
        .patch(&format!("/seasons/{}/status", id), request)
        .await
}

/// DELETE /api/v1/seasons/:id - Delete a season.
pub async fn delete_season(client: &ApiClient, id: i64) -> Result<(), ClientError> {
    client.delete(&format!("/seasons/{}", id)).await
}
