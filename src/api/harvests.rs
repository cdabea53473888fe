//! Harvest endpoints.

use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{DateRangeParams, Harvest, HarvestRequest, Page};

/// GET /api/v1/seasons/:seasonId/harvests - List the harvests of a season.
pub async fn list_harvests(
    client: &ApiClient,
    season_id: i64,
    params: &DateRangeParams,
) -> Result<Page<Harvest>, ClientError> {
    client
        .get_page(&format!("/seasons/{}/harvests", season_id), params)
        .await
}

/// GET /api/v1/harvests/:id - Get a harvest.
pub async fn get_harvest(client: &ApiClient, id: i64) -> Result<Harvest, ClientError> {
    client.get(&format!("/harvests/{}", id)).await
}

/// POST /api/v1/seasons/:seasonId/harvests - Record a harvest.
pub async fn create_harvest(
    client: &ApiClient,
    season_id: i64,
    request: &HarvestRequest,
) -> Result<Harvest, ClientError> {
    client
        .post(&format!("/seasons/{}/harvests", season_id), request)
        .await
}

/// PUT /api/v1/harvests/:id - Update a harvest.
pub async fn update_harvest(
    client: &ApiClient,
    id: i64,
    request: &HarvestRequest,
) -> Result<Harvest, ClientError> {
    client.put(&format!("/harvests/{}", id), request).await
}

/// DELETE /api/v1/harvests/:id - Delete a harvest.
pub async fn delete_harvest(client: &ApiClient, id: i64) -> Result<(), ClientError> {
    client.delete(&format!("/harvests/{}", id)).await
}
