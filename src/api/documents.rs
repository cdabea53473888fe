//! Document endpoints. Reads are public to signed-in users; writes are admin-only.

use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{Document, DocumentRequest};

/// GET /api/v1/documents - List documents.
pub async fn list_documents(client: &ApiClient) -> Result<Vec<Document>, ClientError> {
    client.get_list("/documents").await
}

/// POST /api/v1/admin/documents - Create a document.
pub async fn create_document(
    client: &ApiClient,
    request: &DocumentRequest,
) -> Result<Document, ClientError> {
    client.post("/admin/documents", request).await
}

/// PUT /api/v1/admin/documents/:id - Update a document.
pub async fn update_document(
    client: &ApiClient,
    id: i64,
    request: &DocumentRequest,
) -> Result<Document, ClientError> {
    client
        .put(&format!("/admin/documents/{}", id), request)
        .await
}

/// DELETE /api/v1/admin/documents/:id - Delete a document.
pub async fn delete_document(client: &ApiClient, id: i64) -> Result<(), ClientError> {
    client.delete(&format!("/admin/documents/{}", id)).await
}
