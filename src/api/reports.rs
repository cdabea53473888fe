//! Report endpoints.

use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{Page, Report, ReportDetail, ReportListParams, ReportRequest};

/// GET /api/v1/reports - List reports by type and date range.
pub async fn list_reports(
    client: &ApiClient,
    params: &ReportListParams,
) -> Result<Page<Report>, ClientError> {
    client.get_page("/reports", params).await
}

/// GET /api/v1/reports/:id - Get a report with its content and data.
pub async fn get_report(client: &ApiClient, id: i64) -> Result<ReportDetail, ClientError> {
    client.get(&format!("/reports/{}", id)).await
}

/// POST /api/v1/admin/reports - Create a report.
pub async fn create_report(
    client: &ApiClient,
    request: &ReportRequest,
) -> Result<ReportDetail, ClientError> {
    client.post("/admin/reports", request).await
}

/// PUT /api/v1/admin/reports/:id - Update a report.
pub async fn update_report(
    client: &ApiClient,
    id: i64,
    request: &ReportRequest,
) -> Result<ReportDetail, ClientError> {
    client.put(&format!("/admin/reports/{}", id), request).await
}

/// DELETE /api/v1/admin/reports/:id - Delete a report.
pub async fn delete_report(client: &ApiClient, id: i64) -> Result<(), ClientError> {
    client.delete(&format!("/admin/reports/{}", id)).await
}
