//! Store traits and backends
//!
//! Two external stores back the service: the *mapping store* holds the
//! `short -> target` table and is replaced wholesale on every sync; the
//! *statistics store* holds the target index and the usage counters. Both
//! are expressed as traits so the service layer can run against Redis in
//! production and the in-memory backend in tests.

pub mod backends;
pub mod keys;

pub use backends::memory::{MemoryMappingStore, MemoryStatisticsStore};
pub use backends::redis::{RedisMappingStore, RedisStatisticsStore};

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::Result;

/// The short -> target table.
#[async_trait]
pub trait MappingStore: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Clears the table and writes `entries` in a single atomic batch.
    /// Concurrent readers observe either the old table or the new one,
    /// never a partially written state.
    async fn replace_all(&self, entries: &[(String, String)]) -> Result<()>;
}

/// The target index plus the per-day usage counters.
#[async_trait]
pub trait StatisticsStore: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Reads one counter. `None` when the key is absent or expired.
    async fn get_count(&self, key: &str) -> Result<Option<u64>>;

    async fn set_members(&self, key: &str) -> Result<Vec<String>>;

    /// All keys matching a glob-style pattern, both counters and sets.
    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>>;

    /// Increments every key by one and resets its time-to-live, as a single
    /// batched write. Expiration is refreshed on every increment, not fixed
    /// at first write.
    async fn increment_all(&self, keys: &[String], ttl: Duration) -> Result<()>;

    /// Replaces the target index: deletes every key matching
    /// `stale_pattern`, then adds each `(key, member)` pair, in one atomic
    /// batch.
    async fn rebuild_index(&self, stale_pattern: &str, entries: &[(String, String)]) -> Result<()>;
}
