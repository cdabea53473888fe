//! Field log endpoints.

use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{FieldLog, FieldLogListParams, FieldLogRequest, Page};

/// GET /api/v1/seasons/:seasonId/field-logs - List the field logs of a season.
pub async fn list_field_logs(
    client: &ApiClient,
    season_id: i64,
    params: &FieldLogListParams,
) -> Result<Page<FieldLog>, ClientError> {
    client
        .get_page(&format!("/seasons/{}/field-logs", season_id), params)
        .await
}

/// GET /api/v1/field-logs/:id - Get a field log.
pub async fn get_field_log(client: &ApiClient, id: i64) -> Result<FieldLog, ClientError> {
    client.get(&format!("/field-logs/{}", id)).await
}

/// POST /api/v1/seasons/:seasonId/field-logs - Write a field log.
pub async fn create_field_log(
    client: &ApiClient,
    season_id: i64,
    request: &FieldLogRequest,
) -> Result<FieldLog, ClientError> {
    client
        .post(&format!("/seasons/{}/field-logs", season_id), request)
        .await
}

/// PUT /api/v1/field-logs/:id - Update a field log.
pub async fn update_field_log(
    client: &ApiClient,
    id: i64,
    request: &FieldLogRequest,
) -> Result<FieldLog, ClientError> {
    client.put(&format!("/field-logs/{}", id), request).await
}

/// DELETE /api/v1/field-logs/:id - Delete a field log.
pub async fn delete_field_log(client: &ApiClient, id: i64) -> Result<(), ClientError> {
    client.delete(&format!("/field-logs/{}", id)).await
}
