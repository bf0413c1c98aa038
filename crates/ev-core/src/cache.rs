//! # Expiring Cache
//!
//! Best-effort TTL cache over a `KeyValueStore`. Entries are stored as
//! `{"data": ..., "timestamp": <epoch millis>}` JSON. Nothing here ever
//! fails the caller: unreadable or stale entries are misses.

use crate::traits::{Clock, KeyValueStore, SystemClock};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// TTL used for third-party contributor data.
pub const DEFAULT_TTL: Duration = Duration::from_millis(3_600_000);

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    data: T,
    timestamp: i64,
}

/// Why a read was treated as a miss. Logged only.
#[derive(Error, Debug)]
enum CacheReadError {
    #[error("storage read failed: {0}")]
    Storage(anyhow::Error),
    #[error("malformed entry: {0}")]
    Malformed(serde_json::Error),
}

pub struct ExpiringCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ExpiringCache {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self::with_clock(store, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn KeyValueStore>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { store, ttl, clock }
    }

    /// Returns the cached value if present, readable and not older than the TTL.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let envelope = match self.read::<T>(key).await {
            Ok(Some(envelope)) => envelope,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("cache miss for `{key}`: {e}");
                return None;
            }
        };

        let age = self.clock.now_millis().saturating_sub(envelope.timestamp);
        if age > self.ttl_millis() {
            log::debug!("cache entry `{key}` expired ({age} ms old)");
            if let Err(e) = self.store.remove_item(key).await {
                log::warn!("failed to evict stale cache entry `{key}`: {e}");
            }
            return None;
        }
        Some(envelope.data)
    }

    /// Stores `value` stamped with the current time. Failures are logged and dropped.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) {
        let envelope = Envelope { data: value, timestamp: self.clock.now_millis() };
        let encoded = match serde_json::to_string(&envelope) {
            Ok(encoded) => encoded,
            Err(e) => {
                log::warn!("cache entry `{key}` not serializable: {e}");
                return;
            }
        };
        if let Err(e) = self.store.set_item(key, &encoded).await {
            log::warn!("cache write for `{key}` failed: {e}");
        }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Envelope<T>>, CacheReadError> {
        let Some(raw) = self.store.get_item(key).await.map_err(CacheReadError::Storage)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).map_err(CacheReadError::Malformed)
    }

    fn ttl_millis(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }
}
