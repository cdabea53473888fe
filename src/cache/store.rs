//! The cache store: query identity to last known result, with staleness bookkeeping.
//!
//! The store is plain data. Locking belongs to the owner ([`super::QueryClient`]); every
//! method here is a synchronous transition so callers never hold the lock across I/O.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;

use super::QueryKey;
use crate::errors::ClientError;
use crate::models::Page;

/// Cached payload, kept in its JSON form so one store serves every resource type.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheData {
    Item(Value),
    List(Vec<Value>),
    Page(Page<Value>),
}

impl CacheData {
    /// Classify a JSON value: arrays are lists, objects carrying page metadata are pages,
    /// anything else is a single item.
    pub fn from_value(value: Value) -> Self {
        let looks_like_page = value.get("items").is_some() && value.get("totalElements").is_some();
        if looks_like_page {
            if let Ok(page) = Page::<Value>::deserialize(&value) {
                return CacheData::Page(page);
            }
        }
        match value {
            Value::Array(items) => CacheData::List(items),
            other => CacheData::Item(other),
        }
    }

    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, ClientError> {
        Ok(Self::from_value(serde_json::to_value(value)?))
    }

    pub fn to_value(&self) -> Value {
        match self {
            CacheData::Item(value) => value.clone(),
            CacheData::List(items) => Value::Array(items.clone()),
            CacheData::Page(page) => serde_json::json!({
                "items": page.items,
                "page": page.page,
                "size": page.size,
                "totalElements": page.total_elements,
                "totalPages": page.total_pages,
            }),
        }
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_value(self.to_value())?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub data: CacheData,
    pub fetched_at: Instant,
    /// Set by invalidation; the next read re-fetches regardless of age.
    pub invalidated: bool,
    /// Sequence number of the fetch that produced `data`.
    pub landed_seq: u64,
}

impl CacheEntry {
    pub fn is_stale(&self, ttl: Duration, now: Instant) -> bool {
        self.invalidated || now.saturating_duration_since(self.fetched_at) > ttl
    }
}

/// Handle for one in-flight fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub key: QueryKey,
    pub seq: u64,
}

/// Outcome of landing a fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Stored,
    /// The fetch was cancelled by a mutation after it started.
    Cancelled,
    /// A fetch that started later already landed.
    Superseded,
}

/// Entries under a set of prefixes, captured verbatim.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CacheSnapshot {
    prefixes: Vec<QueryKey>,
    entries: BTreeMap<QueryKey, CacheEntry>,
}

impl CacheSnapshot {
    pub fn entries(&self) -> &BTreeMap<QueryKey, CacheEntry> {
        &self.entries
    }

    pub fn get(&self, key: &QueryKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// A copy with each entry's data rewritten by `f`. Entries for which `f` returns
    /// `None` keep their data.
    pub fn map_data(&self, mut f: impl FnMut(&QueryKey, &CacheData) -> Option<CacheData>) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|(key, entry)| {
                let mut entry = entry.clone();
                if let Some(data) = f(key, &entry.data) {
                    entry.data = data;
                }
                (key.clone(), entry)
            })
            .collect();
        Self {
            prefixes: self.prefixes.clone(),
            entries,
        }
    }
}

#[derive(Debug, Default)]
pub struct CacheStore {
    entries: BTreeMap<QueryKey, CacheEntry>,
    in_flight: BTreeMap<u64, QueryKey>,
    next_seq: u64,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store data fetched now, outside the ticket protocol.
    pub fn set(&mut self, key: QueryKey, data: CacheData) {
        self.next_seq += 1;
        let entry = CacheEntry {
            data,
            fetched_at: Instant::now(),
            invalidated: false,
            landed_seq: self.next_seq,
        };
        self.entries.insert(key, entry);
    }

    pub fn remove(&mut self, key: &QueryKey) -> Option<CacheEntry> {
        self.entries.remove(key)
    }

    /// Keys of every entry under `prefix`.
    pub fn matching(&self, prefix: &QueryKey) -> Vec<QueryKey> {
        self.entries
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Mark every entry under `prefix` stale. Returns how many were marked.
    pub fn invalidate(&mut self, prefix: &QueryKey) -> usize {
        let keys = self.matching(prefix);
        for key in &keys {
            if let Some(entry) = self.entries.get_mut(key) {
                entry.invalidated = true;
            }
        }
        keys.len()
    }

    pub fn begin_fetch(&mut self, key: &QueryKey) -> FetchTicket {
        self.next_seq += 1;
        self.in_flight.insert(self.next_seq, key.clone());
        FetchTicket {
            key: key.clone(),
            seq: self.next_seq,
        }
    }

    /// Land a fetch result unless it was cancelled or superseded.
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, data: CacheData) -> Landing {
        if self.in_flight.remove(&ticket.seq).is_none() {
            return Landing::Cancelled;
        }
        if let Some(existing) = self.entries.get(&ticket.key) {
            if existing.landed_seq > ticket.seq {
                return Landing::Superseded;
            }
        }
        self.entries.insert(
            ticket.key.clone(),
            CacheEntry {
                data,
                fetched_at: Instant::now(),
                invalidated: false,
                landed_seq: ticket.seq,
            },
        );
        Landing::Stored
    }

    /// Forget a fetch that failed.
    pub fn abandon_fetch(&mut self, ticket: &FetchTicket) {
        self.in_flight.remove(&ticket.seq);
    }

    /// Cancel in-flight fetches under `prefix`; their results will be discarded.
    pub fn cancel(&mut self, prefix: &QueryKey) -> usize {
        let cancelled: Vec<u64> = self
            .in_flight
            .iter()
            .filter(|(_, key)| key.starts_with(prefix))
            .map(|(seq, _)| *seq)
            .collect();
        for seq in &cancelled {
            self.in_flight.remove(seq);
        }
        cancelled.len()
    }

    /// Capture every entry under the given prefixes.
    pub fn snapshot(&self, prefixes: &[QueryKey]) -> CacheSnapshot {
        let mut entries = BTreeMap::new();
        for prefix in prefixes {
            for key in self.matching(prefix) {
                if let Some(entry) = self.entries.get(&key) {
                    entries.insert(key, entry.clone());
                }
            }
        }
        CacheSnapshot {
            prefixes: prefixes.to_vec(),
            entries,
        }
    }

    /// Make the entries under the snapshot's prefixes exactly what the snapshot holds.
    pub fn restore(&mut self, snapshot: CacheSnapshot) {
        for prefix in &snapshot.prefixes {
            for key in self.matching(prefix) {
                self.entries.remove(&key);
            }
        }
        self.entries.extend(snapshot.entries);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.in_flight.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResourceKind;
    use serde_json::json;

    fn detail(id: i64) -> QueryKey {
        QueryKey::detail(ResourceKind::Farm, id)
    }

    #[test]
    fn test_classify_values() {
        assert!(matches!(
            CacheData::from_value(json!([1, 2])),
            CacheData::List(_)
        ));
        assert!(matches!(
            CacheData::from_value(json!({"id": 1})),
            CacheData::Item(_)
        ));
        let page = CacheData::from_value(json!({
            "items": [{"id": 1}],
            "page": 0,
            "size": 20,
            "totalElements": 1,
            "totalPages": 1
        }));
        assert!(matches!(page, CacheData::Page(_)));
        assert_eq!(page.to_value()["totalElements"], 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_staleness_by_age_and_invalidation() {
        let mut store = CacheStore::new();
        store.set(detail(1), CacheData::Item(json!({"id": 1})));

        let ttl = Duration::from_secs(60);
        assert!(!store.get(&detail(1)).unwrap().is_stale(ttl, Instant::now()));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(store.get(&detail(1)).unwrap().is_stale(ttl, Instant::now()));

        store.set(detail(1), CacheData::Item(json!({"id": 1})));
        assert_eq!(store.invalidate(&QueryKey::details(ResourceKind::Farm)), 1);
        assert!(store.get(&detail(1)).unwrap().is_stale(ttl, Instant::now()));
    }

    #[test]
    fn test_prefix_matching_respects_segments() {
        let mut store = CacheStore::new();
        store.set(detail(1), CacheData::Item(json!({"id": 1})));
        store.set(detail(10), CacheData::Item(json!({"id": 10})));
        assert_eq!(store.matching(&detail(1)), vec![detail(1)]);
        assert_eq!(store.matching(&QueryKey::all(ResourceKind::Farm)).len(), 2);
        assert!(store.matching(&QueryKey::all(ResourceKind::Plot)).is_empty());
    }

    #[test]
    fn test_superseded_response_is_discarded() {
        let mut store = CacheStore::new();
        let first = store.begin_fetch(&detail(1));
        let second = store.begin_fetch(&detail(1));

        assert_eq!(
            store.complete_fetch(&second, CacheData::Item(json!({"v": 2}))),
            Landing::Stored
        );
        assert_eq!(
            store.complete_fetch(&first, CacheData::Item(json!({"v": 1}))),
            Landing::Superseded
        );
        assert_eq!(
            store.get(&detail(1)).unwrap().data,
            CacheData::Item(json!({"v": 2}))
        );
    }

    #[test]
    fn test_cancelled_response_is_discarded() {
        let mut store = CacheStore::new();
        let ticket = store.begin_fetch(&detail(1));
        assert_eq!(store.cancel(&QueryKey::all(ResourceKind::Farm)), 1);
        assert_eq!(
            store.complete_fetch(&ticket, CacheData::Item(json!({"v": 1}))),
            Landing::Cancelled
        );
        assert!(store.get(&detail(1)).is_none());
    }

    #[test]
    fn test_restore_is_verbatim() {
        let mut store = CacheStore::new();
        store.set(detail(1), CacheData::Item(json!({"name": "a"})));
        let prefixes = vec![detail(1), detail(2)];
        let snapshot = store.snapshot(&prefixes);

        store.set(detail(1), CacheData::Item(json!({"name": "b"})));
        store.set(detail(2), CacheData::Item(json!({"name": "new"})));
        store.restore(snapshot.clone());

        assert_eq!(store.snapshot(&prefixes), snapshot);
        assert!(store.get(&detail(2)).is_none());
    }
}
