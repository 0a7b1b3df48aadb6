//! Nonce store for replay attack prevention.
//!
//! A nonce record lives for a bounded TTL (at least the clock-skew window).
//! After it expires the same nonce is accepted again; the timestamp check
//! already rejects anything that old.
//!
//! The in-memory store keeps records in a DashMap. Check-and-record happens
//! under the shard lock held by `entry()`, so two concurrent callers with the
//! same key can never both observe "absent".

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NonceStoreError {
    #[error("nonce store unavailable: {0}")]
    Unavailable(String),
}

/// Pluggable replay store.
#[async_trait]
pub trait NonceStore: Send + Sync {
    /// Atomically record `key` for `ttl` unless a live record exists.
    ///
    /// Returns `true` if the key was recorded (first use), `false` if a live
    /// record already exists (replay).
    async fn insert_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, NonceStoreError>;
}

/// Thread-safe in-process nonce store.
pub struct MemoryNonceStore {
    /// Namespace prepended to every key
    prefix: String,
    /// Map from prefixed nonce key to expiry instant
    store: DashMap<String, Instant>,
}

impl MemoryNonceStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            store: DashMap::new(),
        }
    }

    /// Insert-if-absent evaluated at `now`.
    ///
    /// An expired record is overwritten in place. TTLs below one second are
    /// raised to one second.
    pub fn insert_if_absent_at(&self, key: &str, ttl: Duration, now: Instant) -> bool {
        let expires_at = now + ttl.max(Duration::from_secs(1));

        match self.store.entry(self.store_key(key)) {
            Entry::Occupied(mut entry) => {
                if *entry.get() > now {
                    return false; // Replay inside TTL
                }
                entry.insert(expires_at);
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(expires_at);
                true
            }
        }
    }

    /// Drop every record that has expired at `now`. Returns how many were removed.
    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.store.len();
        self.store.retain(|_, expires_at| *expires_at > now);
        before.saturating_sub(self.store.len())
    }

    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    /// Get the number of tracked nonces, expired ones included.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn store_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl Default for MemoryNonceStore {
    fn default() -> Self {
        Self::new("")
    }
}

#[async_trait]
impl NonceStore for MemoryNonceStore {
    async fn insert_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, NonceStoreError> {
        Ok(self.insert_if_absent_at(key, ttl, Instant::now()))
    }
}

/// Periodically purge expired records so the map stays bounded.
pub fn spawn_purge_task(store: Arc<MemoryNonceStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let removed = store.purge_expired();
            if removed > 0 {
                tracing::debug!(removed, remaining = store.len(), "purged expired nonces");
            }
        }
    })
}
