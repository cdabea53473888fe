//! Repository: the data-fetching layer.
//!
//! Reads go through the query cache with per-resource freshness windows. Writes go
//! through the mutation coordinator so cached lists reflect them immediately and roll
//! back if the backend refuses.

mod ai;
mod catalog;
mod farms;
mod inventory;
mod seasons;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use validator::Validate;

use crate::api::ApiClient;
use crate::auth::{require_role, Role};
use crate::cache::{QueryClient, QueryKey, QueryResult, DEFAULT_TTL};
use crate::errors::ClientError;
use crate::models::Resource;
use crate::mutation::temp_id;

/// Cached, optimistic access to every backend resource.
#[derive(Debug, Clone)]
pub struct Repository {
    api: Arc<ApiClient>,
    cache: QueryClient,
}

impl Repository {
    pub fn new(api: Arc<ApiClient>, cache: QueryClient) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &QueryClient {
        &self.cache
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    async fn read<T, F, Fut>(
        &self,
        key: Result<QueryKey, ClientError>,
        ttl: Duration,
        fetch: F,
    ) -> QueryResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        match key {
            Ok(key) => self.cache.fetch(key, ttl, fetch).await,
            Err(error) => QueryResult::Failed {
                error,
                last_known: None,
            },
        }
    }

    /// Read one resource by id under its detail key.
    async fn read_detail<T, F, Fut>(&self, id: i64, fetch: F) -> QueryResult<T>
    where
        T: Resource,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let key = QueryKey::detail(T::KIND, id);
        self.cache.fetch(key, DEFAULT_TTL, fetch).await
    }

    async fn require_admin(&self) -> Result<(), ClientError> {
        let user = self.api.session().user().await;
        require_role(user.as_ref(), &[Role::Admin])
    }
}

/// Validate a create request and turn it into a placeholder resource: the request's
/// fields, a temporary id, and the parent reference when the create is scoped.
fn draft<B>(request: &B, parent: Option<(&str, i64)>) -> Result<Value, ClientError>
where
    B: Serialize + Validate,
{
    request.validate()?;
    let mut value = serde_json::to_value(request)?;
    if let Value::Object(fields) = &mut value {
        fields.insert("id".to_string(), Value::from(temp_id()));
        if let Some((field, id)) = parent {
            fields.insert(field.to_string(), Value::from(id));
        }
    }
    Ok(value)
}

/// Validate an update request and return the fields it changes.
fn patch<B>(request: &B) -> Result<Value, ClientError>
where
    B: Serialize + Validate,
{
    request.validate()?;
    Ok(serde_json::to_value(request)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlotRequest;

    #[test]
    fn test_draft_carries_placeholder_and_parent() {
        let value = draft(&PlotRequest::named("North"), Some(("farmId", 4))).unwrap();
        assert_eq!(value["plotName"], "North");
        assert_eq!(value["farmId"], 4);
        assert!(value["id"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_draft_rejects_invalid_request() {
        assert!(matches!(
            draft(&PlotRequest::named(""), None),
            Err(ClientError::Validation(_))
        ));
    }
}
