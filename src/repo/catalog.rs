//! Documents, reports and crop varieties. Writes to these are reserved for admins.

use super::{draft, patch, Repository};
use crate::api::{documents, reports, varieties};
use crate::cache::{QueryKey, QueryResult, DEFAULT_TTL};
use crate::errors::ClientError;
use crate::models::{
    Document, DocumentRequest, Page, Report, ReportDetail, ReportListParams, ReportRequest,
    ResourceKind, Variety, VarietyRequest,
};
use crate::mutation::{run_optimistic, CreateInLists, RemoveFromLists, UpdateInPlace};

fn crop_varieties(crop_id: i64) -> QueryKey {
    QueryKey::lists(ResourceKind::Variety)
        .push("crop")
        .push(crop_id.to_string())
}

impl Repository {
    // ==================== DOCUMENT OPERATIONS ====================

    pub async fn list_documents(&self) -> QueryResult<Vec<Document>> {
        let key = QueryKey::lists(ResourceKind::Document).push("all");
        self.read(Ok(key), DEFAULT_TTL, || documents::list_documents(&self.api))
            .await
    }

    pub async fn create_document(&self, request: &DocumentRequest) -> Result<Document, ClientError> {
        self.require_admin().await?;
        let update = CreateInLists::new(ResourceKind::Document, draft(request, None)?);
        run_optimistic(
            &self.cache,
            &update,
            documents::create_document(&self.api, request),
        )
        .await
    }

    pub async fn update_document(
        &self,
        id: i64,
        request: &DocumentRequest,
    ) -> Result<Document, ClientError> {
        self.require_admin().await?;
        let update = UpdateInPlace::new(ResourceKind::Document, id, patch(request)?);
        run_optimistic(
            &self.cache,
            &update,
            documents::update_document(&self.api, id, request),
        )
        .await
    }

    pub async fn delete_document(&self, id: i64) -> Result<(), ClientError> {
        self.require_admin().await?;
        let update = RemoveFromLists::new(ResourceKind::Document, id);
        run_optimistic(
            &self.cache,
            &update,
            documents::delete_document(&self.api, id),
        )
        .await
    }

    // ==================== REPORT OPERATIONS ====================

    pub async fn list_reports(&self, params: &ReportListParams) -> QueryResult<Page<Report>> {
        let key = QueryKey::list(ResourceKind::Report, params);
        self.read(key, DEFAULT_TTL, || reports::list_reports(&self.api, params))
            .await
    }

    pub async fn get_report(&self, id: i64) -> QueryResult<ReportDetail> {
        self.read_detail(id, || reports::get_report(&self.api, id)).await
    }

    pub async fn create_report(&self, request: &ReportRequest) -> Result<ReportDetail, ClientError> {
        self.require_admin().await?;
        let update = CreateInLists::new(ResourceKind::Report, draft(request, None)?);
        run_optimistic(&self.cache, &update, reports::create_report(&self.api, request)).await
    }

    pub async fn update_report(
        &self,
        id: i64,
        request: &ReportRequest,
    ) -> Result<ReportDetail, ClientError> {
        self.require_admin().await?;
        let update = UpdateInPlace::new(ResourceKind::Report, id, patch(request)?);
        run_optimistic(
            &self.cache,
            &update,
            reports::update_report(&self.api, id, request),
        )
        .await
    }

    pub async fn delete_report(&self, id: i64) -> Result<(), ClientError> {
        self.require_admin().await?;
        let update = RemoveFromLists::new(ResourceKind::Report, id);
        run_optimistic(&self.cache, &update, reports::delete_report(&self.api, id)).await
    }

    // ==================== VARIETY OPERATIONS ====================

    pub async fn list_varieties(&self, crop_id: i64) -> QueryResult<Vec<Variety>> {
        self.read(Ok(crop_varieties(crop_id)), DEFAULT_TTL, || {
            varieties::list_varieties(&self.api, crop_id)
        })
        .await
    }

    pub async fn get_variety(&self, id: i64) -> QueryResult<Variety> {
        self.read_detail(id, || varieties::get_variety(&self.api, id)).await
    }

    pub async fn create_variety(&self, request: &VarietyRequest) -> Result<Variety, ClientError> {
        self.require_admin().await?;
        let update = CreateInLists::new(ResourceKind::Variety, draft(request, None)?)
            .scoped(crop_varieties(request.crop_id));
        run_optimistic(
            &self.cache,
            &update,
            varieties::create_variety(&self.api, request),
        )
        .await
    }

    pub async fn update_variety(
        &self,
        id: i64,
        request: &VarietyRequest,
    ) -> Result<Variety, ClientError> {
        self.require_admin().await?;
        let update = UpdateInPlace::new(ResourceKind::Variety, id, patch(request)?);
        run_optimistic(
            &self.cache,
            &update,
            varieties::update_variety(&self.api, id, request),
        )
        .await
    }

    pub async fn delete_variety(&self, id: i64) -> Result<(), ClientError> {
        self.require_admin().await?;
        let update = RemoveFromLists::new(ResourceKind::Variety, id);
        run_optimistic(
            &self.cache,
            &update,
            varieties::delete_variety(&self.api, id),
        )
        .await
    }
}
