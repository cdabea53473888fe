//! Mutation coordinator.
//!
//! Every write runs through [`run_optimistic`]: snapshot the affected cache entries,
//! install a speculative version, commit to the backend, roll back on failure, and
//! invalidate the affected identities once the outcome is known.

mod updates;

pub use updates::*;

use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::cache::{CacheStore, QueryClient};
use crate::errors::ClientError;

/// One speculative cache change and how to undo it.
///
/// Updates own their data so an abandoned mutation can finish its rollback on a
/// spawned task.
pub trait OptimisticUpdate: Clone + Send + Sync + 'static {
    type Snapshot: Clone + Send + 'static;

    /// Short label for logs.
    fn describe(&self) -> String;

    /// Cancel in-flight reads of the affected identities and capture their entries.
    fn snapshot(&self, store: &mut CacheStore) -> Self::Snapshot;

    /// Compute the speculative state from the captured one. Pure.
    fn apply(&self, snapshot: &Self::Snapshot) -> Self::Snapshot;

    /// Write a state into the store.
    fn install(&self, store: &mut CacheStore, state: Self::Snapshot);

    /// Put the captured state back.
    fn rollback(&self, store: &mut CacheStore, snapshot: Self::Snapshot) {
        self.install(store, snapshot);
    }

    /// Mark every affected identity stale.
    fn settle(&self, store: &mut CacheStore);
}

/// Holds the snapshot of a mutation whose commit has not finished.
///
/// Dropped while still armed, e.g. when the caller's timeout fires first, it rolls back
/// and settles so the speculative state never outlives the mutation.
struct PendingMutation<U: OptimisticUpdate> {
    store: Arc<RwLock<CacheStore>>,
    update: U,
    snapshot: Option<U::Snapshot>,
}

impl<U: OptimisticUpdate> PendingMutation<U> {
    fn disarm(&mut self) -> Option<U::Snapshot> {
        self.snapshot.take()
    }
}

impl<U: OptimisticUpdate> Drop for PendingMutation<U> {
    fn drop(&mut self) {
        let Some(snapshot) = self.snapshot.take() else {
            return;
        };
        tracing::warn!(
            "Abandoned {} before commit finished, rolling back",
            self.update.describe()
        );

        if let Ok(mut store) = self.store.try_write() {
            self.update.rollback(&mut store, snapshot);
            self.update.settle(&mut store);
            return;
        }

        // Lock is busy: finish on the runtime instead of blocking in drop.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let store = self.store.clone();
                let update = self.update.clone();
                handle.spawn(async move {
                    let mut store = store.write().await;
                    update.rollback(&mut store, snapshot);
                    update.settle(&mut store);
                });
            }
            Err(e) => {
                tracing::warn!("Could not roll back {}: {}", self.update.describe(), e);
            }
        }
    }
}

/// Run `commit` under the optimistic protocol and return its outcome.
///
/// Snapshot and speculative apply happen under one write lock with no await between
/// them, so no other task observes a half-applied state. If the returned future is
/// dropped before the commit finishes, the snapshot is restored and the affected
/// identities are invalidated all the same.
///
/// Overlapping mutations on the same identities each restore their own snapshot. A
/// failure therefore discards speculative changes applied after it began, and a later
/// failure can bring back an earlier mutation's change. Settle invalidates every
/// affected identity in both cases, so the next read replaces whatever the rollbacks
/// left behind.
pub async fn run_optimistic<U, T, Fut>(
    cache: &QueryClient,
    update: &U,
    commit: Fut,
) -> Result<T, ClientError>
where
    U: OptimisticUpdate,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let snapshot = {
        let mut store = cache.store().write().await;
        let snapshot = update.snapshot(&mut store);
        let speculative = update.apply(&snapshot);
        update.install(&mut store, speculative);
        snapshot
    };
    tracing::debug!("Applied speculative {}", update.describe());

    let mut pending = PendingMutation {
        store: cache.store().clone(),
        update: update.clone(),
        snapshot: Some(snapshot),
    };

    let outcome = commit.await;

    let mut store = cache.store().write().await;
    if let Some(snapshot) = pending.disarm() {
        if let Err(e) = &outcome {
            tracing::warn!("Rolling back {}: {}", update.describe(), e);
            update.rollback(&mut store, snapshot);
        }
    }
    update.settle(&mut store);

    outcome
}

static LAST_TEMP_ID: AtomicI64 = AtomicI64::new(0);

/// Placeholder id for a resource that does not exist on the server yet.
///
/// Millisecond timestamp, bumped when needed so ids handed out by one process are
/// strictly increasing. Placeholders never survive settle.
pub fn temp_id() -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    let mut last = LAST_TEMP_ID.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_TEMP_ID.compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(current) => last = current,
        }
    }
}
