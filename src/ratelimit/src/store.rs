//! Counter storage seam
//!
//! The limiter needs exactly two operations from its backing store: read a
//! live count and atomically increment-with-expiry. The in-memory store
//! backs tests and single-process deployments; the PostgreSQL store shares
//! counters across processes.

use crate::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "postgres")]
pub use postgres::PostgresCounterStore;

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Live count for a key, or `None` once its window has lapsed
    async fn current(&self, key: &str) -> Result<Option<u32>>;

    /// Increment the key and push its expiry out to `window` from now,
    /// returning the new count. A lapsed entry restarts from 1.
    async fn incr_expire(&self, key: &str, window: Duration) -> Result<u32>;
}

struct CounterEntry {
    count: u32,
    expires_at: Instant,
}

impl CounterEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Process-local counters; lapsed entries reset lazily on the next touch
pub struct MemoryCounterStore {
    counters: Arc<DashMap<String, CounterEntry>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(DashMap::new()),
        }
    }
}

impl Default for MemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn current(&self, key: &str) -> Result<Option<u32>> {
        match self.counters.get(key) {
            Some(entry) if !entry.is_expired() => Ok(Some(entry.count)),
            _ => Ok(None),
        }
    }

    async fn incr_expire(&self, key: &str, window: Duration) -> Result<u32> {
        // The entry guard holds the shard lock, making read-modify-write
        // atomic per key
        let mut entry = self.counters.entry(key.to_string()).or_insert_with(|| CounterEntry {
            count: 0,
            expires_at: Instant::now() + window,
        });
        if entry.is_expired() {
            entry.count = 0;
        }
        entry.count += 1;
        entry.expires_at = Instant::now() + window;
        Ok(entry.count)
    }
}
