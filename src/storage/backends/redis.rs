//! Redis backends for the mapping and statistics stores
//!
//! Each store owns its own client (they live in different logical
//! databases) and keeps one multiplexed connection cached behind a lock,
//! re-established after the first command error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::errors::{Result, ShortenerError};
use crate::storage::{MappingStore, StatisticsStore};

struct RedisHandle {
    client: redis::Client,
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
}

impl RedisHandle {
    async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| ShortenerError::store_operation(format!("invalid redis url: {e}")))?;

        // Ping once so a bad connection string fails at startup, not on the
        // first request.
        let mut conn = client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        debug!("Redis connection established: {}", url);

        Ok(Self {
            client,
            connection: Arc::new(RwLock::new(Some(conn))),
        })
    }

    async fn conn(&self) -> Result<MultiplexedConnection> {
        {
            let guard = self.connection.read().await;
            if let Some(ref conn) = *guard {
                return Ok(conn.clone());
            }
        }

        let mut guard = self.connection.write().await;
        // double check, another task may have reconnected already
        if let Some(ref conn) = *guard {
            return Ok(conn.clone());
        }

        let conn = self.client.get_multiplexed_async_connection().await?;
        *guard = Some(conn.clone());
        debug!("Redis connection re-established");
        Ok(conn)
    }

    async fn reset(&self) {
        let mut guard = self.connection.write().await;
        *guard = None;
        warn!("Redis connection reset after command error");
    }
}

pub struct RedisMappingStore {
    handle: RedisHandle,
}

impl RedisMappingStore {
    pub async fn connect(url: &str) -> Result<Self> {
        Ok(Self {
            handle: RedisHandle::connect(url).await?,
        })
    }
}

#[async_trait]
impl MappingStore for RedisMappingStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.handle.conn().await?;
        match conn.exists::<_, bool>(key).await {
            Ok(v) => Ok(v),
            Err(e) => {
                self.handle.reset().await;
                Err(e.into())
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.handle.conn().await?;
        match conn.get::<_, Option<String>>(key).await {
            Ok(v) => Ok(v),
            Err(e) => {
                self.handle.reset().await;
                Err(e.into())
            }
        }
    }

    async fn replace_all(&self, entries: &[(String, String)]) -> Result<()> {
        let mut conn = self.handle.conn().await?;

        // MULTI/EXEC: readers see the old table until the whole batch lands.
        let mut pipe = redis::pipe();
        pipe.atomic();
        pipe.cmd("FLUSHDB").ignore();
        for (short, target) in entries {
            pipe.set(short, target).ignore();
        }

        match pipe.query_async::<()>(&mut conn).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.handle.reset().await;
                Err(e.into())
            }
        }
    }
}

pub struct RedisStatisticsStore {
    handle: RedisHandle,
}

impl RedisStatisticsStore {
    pub async fn connect(url: &str) -> Result<Self> {
        Ok(Self {
            handle: RedisHandle::connect(url).await?,
        })
    }
}

#[async_trait]
impl StatisticsStore for RedisStatisticsStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.handle.conn().await?;
        match conn.exists::<_, bool>(key).await {
            Ok(v) => Ok(v),
            Err(e) => {
                self.handle.reset().await;
                Err(e.into())
            }
        }
    }

    async fn get_count(&self, key: &str) -> Result<Option<u64>> {
        let mut conn = self.handle.conn().await?;
        match conn.get::<_, Option<u64>>(key).await {
            Ok(v) => Ok(v),
            Err(e) => {
                self.handle.reset().await;
                Err(e.into())
            }
        }
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.handle.conn().await?;
        match conn.smembers::<_, Vec<String>>(key).await {
            Ok(v) => Ok(v),
            Err(e) => {
                self.handle.reset().await;
                Err(e.into())
            }
        }
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.handle.conn().await?;
        match redis::cmd("KEYS")
            .arg(pattern)
            .query_async::<Vec<String>>(&mut conn)
            .await
        {
            Ok(v) => Ok(v),
            Err(e) => {
                self.handle.reset().await;
                Err(e.into())
            }
        }
    }

    async fn increment_all(&self, keys: &[String], ttl: Duration) -> Result<()> {
        let mut conn = self.handle.conn().await?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        for key in keys {
            pipe.incr(key, 1).ignore();
            pipe.expire(key, ttl.as_secs() as i64).ignore();
        }

        match pipe.query_async::<()>(&mut conn).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.handle.reset().await;
                Err(e.into())
            }
        }
    }

    async fn rebuild_index(&self, stale_pattern: &str, entries: &[(String, String)]) -> Result<()> {
        // Only the sync engine writes these keys, so scan-then-delete is not
        // racing any other writer.
        let stale = self.scan_keys(stale_pattern).await?;

        let mut conn = self.handle.conn().await?;
        let mut pipe = redis::pipe();
        pipe.atomic();
        if !stale.is_empty() {
            pipe.del(stale).ignore();
        }
        for (key, member) in entries {
            pipe.sadd(key, member).ignore();
        }

        match pipe.query_async::<()>(&mut conn).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.handle.reset().await;
                Err(e.into())
            }
        }
    }
}
