//! In-memory store backends
//!
//! Used by the test suite and handy for running the service without Redis.
//! They reproduce the semantics the services rely on: atomic wholesale
//! replacement of the mapping table, counter expiration refreshed on every
//! increment, and glob-style key scans.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::errors::Result;
use crate::storage::{MappingStore, StatisticsStore};

/// Matches a Redis-style glob pattern containing `*` wildcards.
fn glob_match(key: &str, pattern: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return key == pattern;
    }

    let mut rest = key;
    for (i, part) in parts.iter().enumerate() {
        if i == 0 {
            match rest.strip_prefix(part) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if i == parts.len() - 1 {
            return rest.ends_with(part);
        } else if let Some(pos) = rest.find(part) {
            rest = &rest[pos + part.len()..];
        } else {
            return false;
        }
    }
    // unreachable for patterns with at least one `*`
    true
}

#[derive(Default)]
pub struct MemoryMappingStore {
    map: Mutex<BTreeMap<String, String>>,
}

impl MemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.lock().is_empty()
    }
}

#[async_trait]
impl MappingStore for MemoryMappingStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.map.lock().contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.lock().get(key).cloned())
    }

    async fn replace_all(&self, entries: &[(String, String)]) -> Result<()> {
        let fresh: BTreeMap<String, String> = entries.iter().cloned().collect();
        *self.map.lock() = fresh;
        Ok(())
    }
}

struct Counter {
    value: u64,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct MemoryStatisticsStore {
    counters: Mutex<BTreeMap<String, Counter>>,
    sets: Mutex<BTreeMap<String, BTreeSet<String>>>,
}

impl MemoryStatisticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn live_counter_keys(&self) -> Vec<String> {
        let now = Utc::now();
        self.counters
            .lock()
            .iter()
            .filter(|(_, c)| c.expires_at > now)
            .map(|(k, _)| k.clone())
            .collect()
    }
}

#[async_trait]
impl StatisticsStore for MemoryStatisticsStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        if self.sets.lock().contains_key(key) {
            return Ok(true);
        }
        Ok(self
            .counters
            .lock()
            .get(key)
            .is_some_and(|c| c.expires_at > Utc::now()))
    }

    async fn get_count(&self, key: &str) -> Result<Option<u64>> {
        Ok(self
            .counters
            .lock()
            .get(key)
            .filter(|c| c.expires_at > Utc::now())
            .map(|c| c.value))
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        Ok(self
            .sets
            .lock()
            .get(key)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self
            .sets
            .lock()
            .keys()
            .filter(|k| glob_match(k, pattern))
            .cloned()
            .collect();
        keys.extend(
            self.live_counter_keys()
                .into_iter()
                .filter(|k| glob_match(k, pattern)),
        );
        Ok(keys)
    }

    async fn increment_all(&self, keys: &[String], ttl: Duration) -> Result<()> {
        let expires_at = Utc::now()
            + chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36500));
        let mut counters = self.counters.lock();
        for key in keys {
            let counter = counters.entry(key.clone()).or_insert(Counter {
                value: 0,
                expires_at,
            });
            counter.value += 1;
            counter.expires_at = expires_at;
        }
        Ok(())
    }

    async fn rebuild_index(&self, stale_pattern: &str, entries: &[(String, String)]) -> Result<()> {
        let mut sets = self.sets.lock();
        sets.retain(|k, _| !glob_match(k, stale_pattern));
        for (key, member) in entries {
            sets.entry(key.clone()).or_default().insert(member.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_matches_the_key_families() {
        assert!(glob_match("target:https://a", "target:*"));
        assert!(glob_match("short:s:date:2026-08-29:total", "short:s:date:*:total"));
        assert!(glob_match(
            "short:s:date:2026-08-29:ua:windows",
            "short:s:date:2026-08-29:ua:*"
        ));
        assert!(!glob_match("short:s:date:2026-08-29:ua:mac", "short:s:date:*:total"));
        assert!(!glob_match("short:other:date:2026-08-29:total", "short:s:date:*:total"));
    }

    #[tokio::test]
    async fn expired_counters_are_invisible() {
        let store = MemoryStatisticsStore::new();
        let key = "short:abc:date:2026-08-29:total".to_string();
        store
            .increment_all(std::slice::from_ref(&key), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(store.get_count(&key).await.unwrap(), None);
        assert!(!store.exists(&key).await.unwrap());
        assert!(store.scan_keys("short:*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn increment_refreshes_expiration_and_value() {
        let store = MemoryStatisticsStore::new();
        let key = "short:abc:date:2026-08-29:total".to_string();
        store
            .increment_all(std::slice::from_ref(&key), Duration::from_secs(60))
            .await
            .unwrap();
        store
            .increment_all(std::slice::from_ref(&key), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get_count(&key).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn rebuild_index_drops_stale_sets() {
        let store = MemoryStatisticsStore::new();
        store
            .rebuild_index(
                "target:*",
                &[("target:https://old".to_string(), "o".to_string())],
            )
            .await
            .unwrap();
        store
            .rebuild_index(
                "target:*",
                &[("target:https://new".to_string(), "n".to_string())],
            )
            .await
            .unwrap();
        let keys = store.scan_keys("target:*").await.unwrap();
        assert_eq!(keys, vec!["target:https://new".to_string()]);
    }
}
