//! Expense endpoints.

use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{Expense, ExpenseListParams, ExpenseRequest, Page};

/// GET /api/v1/seasons/:seasonId/expenses - List the expenses of a season.
pub async fn list_expenses(
    client: &ApiClient,
    season_id: i64,
    params: &ExpenseListParams,
) -> Result<Page<Expense>, ClientError> {
    client
        .get_page(&format!("/seasons/{}/expenses", season_id), params)
        .await
}

/// GET /api/v1/expenses/:id - Get an expense.
pub async fn get_expense(client: &ApiClient, id: i64) -> Result<Expense, ClientError> {
    client.get(&format!("/expenses/{}", id)).await
}

/// POST /api/v1/seasons/:seasonId/expenses - Record an expense.
pub async fn create_expense(
    client: &ApiClient,
    season_id: i64,
    request: &ExpenseRequest,
) -> Result<Expense, ClientError> {
    client
        .post(&format!("/seasons/{}/expenses", season_id), request)
        .await
}

/// PUT /api/v1/expenses/:id - Update an expense.
pub async fn update_expense(
    client: &ApiClient,
    id: i64,
    request: &ExpenseRequest,
) -> Result<Expense, ClientError> {
    client.put(&format!("/expenses/{}", id), request).await
}

/// DELETE /api/v1/expenses/:id - Delete an expense.
pub async fn delete_expense(client: &ApiClient, id: i64) -> Result<(), ClientError> {
    client.delete(&format!("/expenses/{}", id)).await
}
