//! Query cache.
//!
//! [`QueryClient`] owns the [`CacheStore`] for one session and implements the read path:
//! fresh entries are served from memory, stale or missing ones are fetched, and a failed
//! fetch hands back the last known data together with the error.

mod keys;
mod store;

pub use keys::*;
pub use store::*;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::errors::ClientError;

/// Result of a read through the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult<T> {
    /// Fetched from the backend by this read.
    Fresh(T),
    /// Served from a cache entry still inside its freshness window.
    Cached(T),
    /// The fetch failed. `last_known` holds the previous data, if any.
    Failed {
        error: ClientError,
        last_known: Option<T>,
    },
}

impl<T> QueryResult<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            QueryResult::Fresh(value) | QueryResult::Cached(value) => Some(value),
            QueryResult::Failed { last_known, .. } => last_known.as_ref(),
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            QueryResult::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, QueryResult::Cached(_))
    }

    /// Drop the last known data and surface the error, if any.
    pub fn into_result(self) -> Result<T, ClientError> {
        match self {
            QueryResult::Fresh(value) | QueryResult::Cached(value) => Ok(value),
            QueryResult::Failed { error, .. } => Err(error),
        }
    }
}

/// Shared handle to the cache store of one session.
#[derive(Debug, Clone, Default)]
pub struct QueryClient {
    store: Arc<RwLock<CacheStore>>,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &Arc<RwLock<CacheStore>> {
        &self.store
    }

    /// Read `key` through the cache, calling `fetcher` when the entry is missing, stale
    /// or no longer decodes as `T`.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, ttl: Duration, fetcher: F) -> QueryResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let ticket = {
            let mut store = self.store.write().await;
            if let Some(entry) = store.get(&key) {
                if !entry.is_stale(ttl, Instant::now()) {
                    match entry.data.decode::<T>() {
                        Ok(value) => {
                            tracing::debug!("Cache hit for {}", key);
                            return QueryResult::Cached(value);
                        }
                        Err(e) => tracing::debug!("Cached entry {} unusable: {}", key, e),
                    }
                }
            }
            tracing::debug!("Cache miss for {}", key);
            store.begin_fetch(&key)
        };

        match fetcher().await {
            Ok(value) => {
                match CacheData::from_serialize(&value) {
                    Ok(data) => {
                        let mut store = self.store.write().await;
                        match store.complete_fetch(&ticket, data) {
                            Landing::Stored => {}
                            landing => {
                                tracing::debug!("Discarded late response for {}: {:?}", key, landing)
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Could not cache response for {}: {}", key, e);
                        self.store.write().await.abandon_fetch(&ticket);
                    }
                }
                QueryResult::Fresh(value)
            }
            Err(error) => {
                let mut store = self.store.write().await;
                store.abandon_fetch(&ticket);

                if matches!(error, ClientError::NotFound(_)) {
                    store.remove(&key);
                    return QueryResult::Failed {
                        error,
                        last_known: None,
                    };
                }

                let last_known = store
                    .get(&key)
                    .and_then(|entry| entry.data.decode::<T>().ok());
                tracing::warn!("Fetch for {} failed: {}", key, error);
                QueryResult::Failed { error, last_known }
            }
        }
    }

    /// Decode the current entry for `key` without fetching, fresh or not.
    pub async fn peek<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let store = self.store.read().await;
        store.get(key).and_then(|entry| entry.data.decode().ok())
    }

    pub async fn invalidate(&self, prefix: &QueryKey) -> usize {
        self.store.write().await.invalidate(prefix)
    }

    pub async fn clear(&self) {
        self.store.write().await.clear();
    }
}
