//! Farms and plots.

use super::{draft, patch, Repository};
use crate::api::{farms, plots};
use crate::cache::{QueryKey, QueryResult, DEFAULT_TTL};
use crate::errors::ClientError;
use crate::models::{
    Farm, FarmCreateRequest, FarmDetail, FarmListParams, FarmUpdateRequest, ListParams, Page,
    Plot, PlotRequest, ResourceKind,
};
use crate::mutation::{run_optimistic, CreateInLists, Invalidation, RemoveFromLists, UpdateInPlace};

impl Repository {
    // ==================== FARM OPERATIONS ====================

    pub async fn list_farms(&self, params: &FarmListParams) -> QueryResult<Page<Farm>> {
        let key = QueryKey::list(ResourceKind::Farm, params);
        self.read(key, DEFAULT_TTL, || farms::list_farms(&self.api, params))
            .await
    }

    pub async fn get_farm(&self, id: i64) -> QueryResult<FarmDetail> {
        self.read_detail(id, || farms::get_farm(&self.api, id)).await
    }

    pub async fn create_farm(&self, request: &FarmCreateRequest) -> Result<FarmDetail, ClientError> {
        let update = CreateInLists::new(ResourceKind::Farm, draft(request, None)?);
        run_optimistic(&self.cache, &update, farms::create_farm(&self.api, request)).await
    }

    pub async fn update_farm(
        &self,
        id: i64,
        request: &FarmUpdateRequest,
    ) -> Result<FarmDetail, ClientError> {
        let update = UpdateInPlace::new(ResourceKind::Farm, id, patch(request)?);
        run_optimistic(&self.cache, &update, farms::update_farm(&self.api, id, request)).await
    }

    pub async fn delete_farm(&self, id: i64) -> Result<(), ClientError> {
        let update = RemoveFromLists::new(ResourceKind::Farm, id).also_invalidate(
            QueryKey::scoped_lists(ResourceKind::Plot, ResourceKind::Farm, id),
        );
        run_optimistic(&self.cache, &update, farms::delete_farm(&self.api, id)).await
    }

    /// Restore a deleted farm. Where it reappears depends on list filters, so nothing is
    /// applied speculatively.
    pub async fn restore_farm(&self, id: i64) -> Result<FarmDetail, ClientError> {
        let update = Invalidation::new(vec![QueryKey::all(ResourceKind::Farm)]);
        run_optimistic(&self.cache, &update, farms::restore_farm(&self.api, id)).await
    }

    // ==================== PLOT OPERATIONS ====================

    pub async fn list_plots(&self) -> QueryResult<Vec<Plot>> {
        let key = QueryKey::lists(ResourceKind::Plot).push("all");
        self.read(Ok(key), DEFAULT_TTL, || plots::list_plots(&self.api))
            .await
    }

    pub async fn list_farm_plots(
        &self,
        farm_id: i64,
        params: &ListParams,
    ) -> QueryResult<Page<Plot>> {
        let key = QueryKey::scoped_list(ResourceKind::Plot, ResourceKind::Farm, farm_id, params);
        self.read(key, DEFAULT_TTL, || {
            plots::list_farm_plots(&self.api, farm_id, params)
        })
        .await
    }

    pub async fn get_plot(&self, id: i64) -> QueryResult<Plot> {
        self.read_detail(id, || plots::get_plot(&self.api, id)).await
    }

    pub async fn create_plot(&self, request: &PlotRequest) -> Result<Plot, ClientError> {
        let update = CreateInLists::new(ResourceKind::Plot, draft(request, None)?);
        run_optimistic(&self.cache, &update, plots::create_plot(&self.api, request)).await
    }

    /// Create a plot in a farm. The farm's plot lists show it at once; the farm detail
    /// is refreshed afterwards since its plot counts change.
    pub async fn create_farm_plot(
        &self,
        farm_id: i64,
        request: &PlotRequest,
    ) -> Result<Plot, ClientError> {
        let update =
            CreateInLists::new(ResourceKind::Plot, draft(request, Some(("farmId", farm_id)))?)
                .scoped(QueryKey::scoped_lists(
                    ResourceKind::Plot,
                    ResourceKind::Farm,
                    farm_id,
                ))
                .also_invalidate(QueryKey::detail(ResourceKind::Farm, farm_id));
        run_optimistic(
            &self.cache,
            &update,
            plots::create_farm_plot(&self.api, farm_id, request),
        )
        .await
    }

    pub async fn update_plot(&self, id: i64, request: &PlotRequest) -> Result<Plot, ClientError> {
        let update = UpdateInPlace::new(ResourceKind::Plot, id, patch(request)?)
            .also_invalidate(QueryKey::details(ResourceKind::Farm));
        run_optimistic(&self.cache, &update, plots::update_plot(&self.api, id, request)).await
    }

    pub async fn delete_plot(&self, id: i64) -> Result<(), ClientError> {
        let update = RemoveFromLists::new(ResourceKind::Plot, id)
            .also_invalidate(QueryKey::details(ResourceKind::Farm));
        run_optimistic(&self.cache, &update, plots::delete_plot(&self.api, id)).await
    }
}
