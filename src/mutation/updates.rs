//! The speculative changes used by the repository: create, update in place, remove, and
//! plain invalidation.

use serde_json::{Map, Value};

use super::OptimisticUpdate;
use crate::cache::{CacheData, CacheSnapshot, CacheStore, QueryKey};
use crate::models::{Page, ResourceKind};

fn has_id(value: &Value, id: i64) -> bool {
    value.get("id").and_then(Value::as_i64) == Some(id)
}

/// Shallow merge of `patch` over `base`. Non-object values are replaced.
fn merge(base: &Value, patch: &Value) -> Value {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            let mut merged: Map<String, Value> = base.clone();
            for (field, value) in patch {
                merged.insert(field.clone(), value.clone());
            }
            Value::Object(merged)
        }
        _ => patch.clone(),
    }
}

fn capture(store: &mut CacheStore, prefixes: &[QueryKey]) -> CacheSnapshot {
    for prefix in prefixes {
        let cancelled = store.cancel(prefix);
        if cancelled > 0 {
            tracing::debug!("Cancelled {} in-flight fetches under {}", cancelled, prefix);
        }
    }
    store.snapshot(prefixes)
}

fn invalidate_all(store: &mut CacheStore, prefixes: &[QueryKey], related: &[QueryKey]) {
    for prefix in prefixes.iter().chain(related) {
        store.invalidate(prefix);
    }
}

fn recount<T>(page: &mut Page<T>) {
    if page.size > 0 {
        page.items.truncate(page.size as usize);
    }
    page.total_pages = Page::<T>::expected_total_pages(page.total_elements, page.size);
}

/// Prepend a placeholder resource to every list that could contain it.
#[derive(Debug, Clone)]
pub struct CreateInLists {
    kind: ResourceKind,
    scope: Option<QueryKey>,
    draft: Value,
    related: Vec<QueryKey>,
}

impl CreateInLists {
    /// `draft` must already carry its placeholder id.
    pub fn new(kind: ResourceKind, draft: Value) -> Self {
        Self {
            kind,
            scope: None,
            draft,
            related: Vec::new(),
        }
    }

    /// Also target the lists under `scope`, e.g. the plot lists of one farm.
    pub fn scoped(mut self, scope: QueryKey) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Invalidate `key` at settle as well.
    pub fn also_invalidate(mut self, key: QueryKey) -> Self {
        self.related.push(key);
        self
    }

    fn prefixes(&self) -> Vec<QueryKey> {
        vec![QueryKey::lists(self.kind)]
    }

    fn targets(&self, key: &QueryKey) -> bool {
        // Unscoped lists are `[kind, "list", params]`.
        let unscoped = key.segments().len() == 3;
        let in_scope = self
            .scope
            .as_ref()
            .map(|scope| key.starts_with(scope))
            .unwrap_or(false);
        unscoped || in_scope
    }
}

impl OptimisticUpdate for CreateInLists {
    type Snapshot = CacheSnapshot;

    fn describe(&self) -> String {
        format!("create of {}", self.kind.as_str())
    }

    fn snapshot(&self, store: &mut CacheStore) -> CacheSnapshot {
        capture(store, &self.prefixes())
    }

    fn apply(&self, snapshot: &CacheSnapshot) -> CacheSnapshot {
        snapshot.map_data(|key, data| {
            if !self.targets(key) {
                return None;
            }
            match data {
                CacheData::List(items) => {
                    let mut items = items.clone();
                    items.insert(0, self.draft.clone());
                    Some(CacheData::List(items))
                }
                CacheData::Page(page) => {
                    let mut page = page.clone();
                    page.items.insert(0, self.draft.clone());
                    page.total_elements += 1;
                    recount(&mut page);
                    Some(CacheData::Page(page))
                }
                CacheData::Item(_) => None,
            }
        })
    }

    fn install(&self, store: &mut CacheStore, state: CacheSnapshot) {
        store.restore(state);
    }

    fn settle(&self, store: &mut CacheStore) {
        invalidate_all(store, &self.prefixes(), &self.related);
    }
}

/// Merge new field values into the resource wherever it is cached.
#[derive(Debug, Clone)]
pub struct UpdateInPlace {
    kind: ResourceKind,
    id: i64,
    patch: Value,
    related: Vec<QueryKey>,
}

impl UpdateInPlace {
    pub fn new(kind: ResourceKind, id: i64, patch: Value) -> Self {
        Self {
            kind,
            id,
            patch,
            related: Vec::new(),
        }
    }

    pub fn also_invalidate(mut self, key: QueryKey) -> Self {
        self.related.push(key);
        self
    }

    fn prefixes(&self) -> Vec<QueryKey> {
        vec![
            QueryKey::lists(self.kind),
            QueryKey::detail(self.kind, self.id),
        ]
    }
}

impl OptimisticUpdate for UpdateInPlace {
    type Snapshot = CacheSnapshot;

    fn describe(&self) -> String {
        format!("update of {} {}", self.kind.as_str(), self.id)
    }

    fn snapshot(&self, store: &mut CacheStore) -> CacheSnapshot {
        capture(store, &self.prefixes())
    }

    fn apply(&self, snapshot: &CacheSnapshot) -> CacheSnapshot {
        let merge_matching = |items: &[Value]| -> Vec<Value> {
            items
                .iter()
                .map(|item| {
                    if has_id(item, self.id) {
                        merge(item, &self.patch)
                    } else {
                        item.clone()
                    }
                })
                .collect()
        };

        snapshot.map_data(|_, data| match data {
            CacheData::Item(item) if has_id(item, self.id) => {
                Some(CacheData::Item(merge(item, &self.patch)))
            }
            CacheData::Item(_) => None,
            CacheData::List(items) => Some(CacheData::List(merge_matching(items))),
            CacheData::Page(page) => {
                let mut page = page.clone();
                page.items = merge_matching(&page.items);
                Some(CacheData::Page(page))
            }
        })
    }

    fn install(&self, store: &mut CacheStore, state: CacheSnapshot) {
        store.restore(state);
    }

    fn settle(&self, store: &mut CacheStore) {
        invalidate_all(store, &self.prefixes(), &self.related);
    }
}

/// Drop the resource from every cached list.
#[derive(Debug, Clone)]
pub struct RemoveFromLists {
    kind: ResourceKind,
    id: i64,
    related: Vec<QueryKey>,
}

impl RemoveFromLists {
    pub fn new(kind: ResourceKind, id: i64) -> Self {
        Self {
            kind,
            id,
            related: Vec::new(),
        }
    }

    pub fn also_invalidate(mut self, key: QueryKey) -> Self {
        self.related.push(key);
        self
    }

    fn prefixes(&self) -> Vec<QueryKey> {
        vec![
            QueryKey::lists(self.kind),
            QueryKey::detail(self.kind, self.id),
        ]
    }
}

impl OptimisticUpdate for RemoveFromLists {
    type Snapshot = CacheSnapshot;

    fn describe(&self) -> String {
        format!("delete of {} {}", self.kind.as_str(), self.id)
    }

    fn snapshot(&self, store: &mut CacheStore) -> CacheSnapshot {
        capture(store, &self.prefixes())
    }

    fn apply(&self, snapshot: &CacheSnapshot) -> CacheSnapshot {
        snapshot.map_data(|_, data| match data {
            CacheData::List(items) => Some(CacheData::List(
                items
                    .iter()
                    .filter(|item| !has_id(item, self.id))
                    .cloned()
                    .collect(),
            )),
            CacheData::Page(page) => {
                let mut page = page.clone();
                let before = page.items.len();
                page.items.retain(|item| !has_id(item, self.id));
                let removed = (before - page.items.len()) as u64;
                page.total_elements = page.total_elements.saturating_sub(removed);
                recount(&mut page);
                Some(CacheData::Page(page))
            }
            CacheData::Item(_) => None,
        })
    }

    fn install(&self, store: &mut CacheStore, state: CacheSnapshot) {
        store.restore(state);
    }

    fn settle(&self, store: &mut CacheStore) {
        invalidate_all(store, &self.prefixes(), &self.related);
    }
}

/// No speculative change; the affected identities are only invalidated at settle.
#[derive(Debug, Clone)]
pub struct Invalidation {
    prefixes: Vec<QueryKey>,
}

impl Invalidation {
    pub fn new(prefixes: Vec<QueryKey>) -> Self {
        Self { prefixes }
    }
}

impl OptimisticUpdate for Invalidation {
    type Snapshot = ();

    fn describe(&self) -> String {
        let keys: Vec<String> = self.prefixes.iter().map(ToString::to_string).collect();
        format!("invalidation of {}", keys.join(" "))
    }

    fn snapshot(&self, store: &mut CacheStore) {
        for prefix in &self.prefixes {
            store.cancel(prefix);
        }
    }

    fn apply(&self, _snapshot: &()) {}

    fn install(&self, _store: &mut CacheStore, _state: ()) {}

    fn settle(&self, store: &mut CacheStore) {
        invalidate_all(store, &self.prefixes, &[]);
    }
}
