//! In-process caches
//!
//! Two independent pieces live here:
//! - [`TtlCache`], a cache-aside decorator that memoizes a fallible async
//!   computation per key for a fixed time-to-live
//! - [`SnapshotStore`], the last-known-good store consulted when live
//!   resolution of YouTube uploads fails, with [`InMemorySnapshotStore`] as
//!   the process-lifetime implementation

use crate::types::{LastKnownGoodEntry, UploadsResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cache-aside memoization with a fixed time-to-live
///
/// A lookup serves the stored value while it is younger than the TTL and
/// otherwise runs the supplied computation. Only successful results are
/// stored, so an upstream failure is retried on the next call. Concurrent
/// callers that miss at the same time each run the computation; the last one
/// to finish overwrites the entry.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, (Instant, V)>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache whose entries live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the fresh cached value for `key`, if any
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    /// Store `value` under `key`, resetting its age
    pub async fn insert(&self, key: K, value: V) {
        self.entries
            .write()
            .await
            .insert(key, (Instant::now(), value));
    }

    /// Serve `key` from the cache or compute, store and return it
    ///
    /// # Errors
    /// Returns whatever error `compute` produced; nothing is stored in that case.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }

        let value = compute().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Drop the entry for `key`
    pub async fn invalidate(&self, key: &K) {
        self.entries.write().await.remove(key);
    }

    /// Drop every entry
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

/// Storage for last-known-good upload snapshots, keyed by channel ID
///
/// Implementations must replace an entry atomically on `set`; when writers
/// race the last one wins.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Fetch the snapshot stored for `key`
    async fn get(&self, key: &str) -> Option<LastKnownGoodEntry>;

    /// Replace the snapshot for `key`
    async fn set(&self, key: &str, data: UploadsResult, updated_at: DateTime<Utc>);
}

/// Process-lifetime [`SnapshotStore`] backed by a map
#[derive(Default)]
pub struct InMemorySnapshotStore {
    entries: RwLock<HashMap<String, LastKnownGoodEntry>>,
}

impl InMemorySnapshotStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of channels with a snapshot
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when no snapshot is stored
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every snapshot
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn get(&self, key: &str) -> Option<LastKnownGoodEntry> {
        self.entries.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, data: UploadsResult, updated_at: DateTime<Utc>) {
        self.entries
            .write()
            .await
            .insert(key.to_string(), LastKnownGoodEntry { updated_at, data });
    }
}
