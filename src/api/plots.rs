//! Plot endpoints, both unscoped and under a farm.

use super::ApiClient;
use crate::errors::ClientError;
use crate::models::{ListParams, Page, Plot, PlotRequest};

/// GET /api/v1/plots - List every plot of the signed-in farmer.
pub async fn list_plots(client: &ApiClient) -> Result<Vec<Plot>, ClientError> {
    client.get_list("/plots").await
}

/// GET /api/v1/farms/:farmId/plots - List the plots of one farm.
pub async fn list_farm_plots(
    client: &ApiClient,
    farm_id: i64,
    params: &ListParams,
) -> Result<Page<Plot>, ClientError> {
    client
        .get_page(&format!("/farms/{}/plots", farm_id), params)
        .await
}

/// GET /api/v1/plots/:id - Get a plot.
pub async fn get_plot(client: &ApiClient, id: i64) -> Result<Plot, ClientError> {
    client.get(&format!("/plots/{}", id)).await
}

/// POST /api/v1/plots - Create a plot outside any farm.
pub async fn create_plot(client: &ApiClient, request: &PlotRequest) -> Result<Plot, ClientError> {
    client.post("/plots", request).await
}

/// POST /api/v1/farms/:farmId/plots - Create a plot in a farm.
pub async fn create_farm_plot(
    client: &ApiClient,
    farm_id: i64,
    request: &PlotRequest,
) -> Result<Plot, ClientError> {
    client
        .post(&format!("/farms/{}/plots", farm_id), request)
        .await
}

/// PUT /api/v1/plots/:id - Update a plot.
pub async fn update_plot(
    client: &ApiClient,
    id: i64,
    request: &PlotRequest,
) -> Result<Plot, ClientError> {
    client.put(&format!("/plots/{}", id), request).await
}

/// DELETE /api/v1/plots/:id - Delete a plot.
pub async fn delete_plot(client: &ApiClient, id: i64) -> Result<(), ClientError> {
    client.delete(&format!("/plots/{}", id)).await
}
