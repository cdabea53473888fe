//! Task endpoints. Tasks are listed and created under a season.

use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{Page, Task, TaskListParams, TaskRequest, TaskStatusUpdateRequest};

/// GET /api/v1/seasons/:seasonId/tasks - List the tasks of a season.
pub async fn list_tasks(
    client: &ApiClient,
    season_id: i64,
    params: &TaskListParams,
) -> Result<Page<Task>, ClientError> {
    client
        .get_page(&format!("/seasons/{}/tasks", season_id), params)
        .await
}

/// GET /api/v1/tasks/:id - Get a task.
pub async fn get_task(client: &ApiClient, id: i64) -> Result<Task, ClientError> {
    client.get(&format!("/tasks/{}", id)).await
}

/// POST /api/v1/seasons/:seasonId/tasks - Create a task in a season.
pub async fn create_task(
    client: &ApiClient,
    season_id: i64,
    request: &TaskRequest,
) -> Result<Task, ClientError> {
    client
        .post(&format!("/seasons/{}/tasks", season_id), request)
        .await
}

/// PUT /api/v1/tasks/:id - Update a task.
pub async fn update_task(
    client: &ApiClient,
    id: i64,
    request: &TaskRequest,
) -> Result<Task, ClientError> {
    client.put(&format!("/tasks/{}", id), request).await
}

/// PATCH /api/v1/tasks/:id/status - Change a task's status.
pub async fn update_task_status(
    client: &ApiClient,
    id: i64,
    request: &TaskStatusUpdateRequest,
) -> Result<Task, ClientError> {
    client.patch(&format!("/tasks/{}/status", id), request).await
}

/// DELETE /api/v1/tasks/:id - Delete a task.
pub async fn delete_task(client: &ApiClient, id: i64) -> Result<(), ClientError> {
    client.delete(&format!("/tasks/{}", id)).await
}
