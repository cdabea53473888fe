//! Inventory.

use validator::Validate;

use super::Repository;
use crate::api::inventory;
use crate::cache::{QueryKey, QueryResult, ON_HAND_TTL};
use crate::errors::ClientError;
use crate::models::{OnHandParams, ResourceKind, StockMovement, StockMovementRequest};
use crate::mutation::{run_optimistic, Invalidation};

impl Repository {
    // ==================== INVENTORY OPERATIONS ====================

    /// On-hand quantity of a supply lot. Stock moves often, so this has the shortest
    /// freshness window of any read.
    pub async fn on_hand(&self, lot_id: i64, params: &OnHandParams) -> QueryResult<f64> {
        let key = QueryKey::all(ResourceKind::Inventory)
            .push("on-hand")
            .push(lot_id.to_string())
            .with_params(params);
        self.read(key, ON_HAND_TTL, || inventory::on_hand(&self.api, lot_id, params))
            .await
    }

    /// Record a movement. Every on-hand figure may change, so all of them are refreshed.
    pub async fn record_movement(
        &self,
        request: &StockMovementRequest,
    ) -> Result<StockMovement, ClientError> {
        request.validate()?;
        let update = Invalidation::new(vec![QueryKey::all(ResourceKind::Inventory)]);
        run_optimistic(
            &self.cache,
            &update,
            inventory::record_movement(&self.api, request),
        )
        .await
    }
}
