//! Incident endpoints.

use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{Incident, IncidentCreateRequest, IncidentUpdateRequest};

/// GET /api/v1/seasons/:seasonId/incidents - List the incidents of a season.
pub async fn list_incidents(
    client: &ApiClient,
    season_id: i64,
) -> Result<Vec<Incident>, ClientError> {
    client
        .get_list(&format!("/seasons/{}/incidents", season_id))
        .await
}

/// POST /api/v1/seasons/:seasonId/incidents - Report an incident.
pub async fn create_incident(
    client: &ApiClient,
    season_id: i64,
    request: &IncidentCreateRequest,
) -> Result<Incident, ClientError> {
    client
        .post(&format!("/seasons/{}/incidents", season_id), request)
        .await
}

/// PUT /api/v1/incidents/:id - Update an incident's status or details.
pub async fn update_incident(
    client: &ApiClient,
    id: i64,
    request: &IncidentUpdateRequest,
) -> Result<Incident, ClientError> {
    client.put(&format!("/incidents/{}", id), request).await
}

/// DELETE /api/v1/incidents/:id - Delete an incident.
pub async fn delete_incident(client: &ApiClient, id: i64) -> Result<(), ClientError> {
    client.delete(&format!("/incidents/{}", id)).await
}
