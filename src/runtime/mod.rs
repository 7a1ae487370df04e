//! Startup wiring and the periodic sync scheduler

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config;
use crate::services::{MetricsService, RedirectService, StatisticsService, SyncService};
use crate::storage::{MappingStore, RedisMappingStore, RedisStatisticsStore, StatisticsStore};

pub struct StartupContext {
    pub sync: Arc<SyncService>,
    pub redirect: Arc<RedirectService>,
    pub statistics: Arc<StatisticsService>,
    pub metrics: Arc<MetricsService>,
}

/// Connects the stores, builds the services and runs the initial sync.
///
/// The initial sync is best effort: on failure the service starts with
/// whatever mapping state the store already holds.
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let cfg = config::get_config();
    debug!("Starting pre-startup processing...");

    let mapping: Arc<dyn MappingStore> = Arc::new(
        RedisMappingStore::connect(&cfg.stores.mapping_url)
            .await
            .context("Failed to connect to the mapping store")?,
    );
    let statistics_store: Arc<dyn StatisticsStore> = Arc::new(
        RedisStatisticsStore::connect(&cfg.stores.statistics_url)
            .await
            .context("Failed to connect to the statistics store")?,
    );

    let sync = Arc::new(
        SyncService::new(
            cfg.source.location.clone(),
            mapping.clone(),
            statistics_store.clone(),
        )
        .with_fetch_timeout(Duration::from_secs(cfg.source.fetch_timeout_secs)),
    );

    if let Err(e) = sync.sync().await {
        warn!("An error occurred in an attempt to sync the db: {}", e);
    }

    let retention_days = cfg.statistics.retention_days;
    Ok(StartupContext {
        sync,
        redirect: Arc::new(RedirectService::new(mapping)),
        statistics: Arc::new(StatisticsService::new(
            statistics_store.clone(),
            retention_days,
        )),
        metrics: Arc::new(MetricsService::new(statistics_store, retention_days)),
    })
}

/// Spawns the periodic sync task. Failures are logged, never fatal; the
/// returned handle is aborted on shutdown.
pub fn spawn_sync_scheduler(sync: Arc<SyncService>, every: Duration) -> JoinHandle<()> {
    info!("Scheduling sync every {:?}", every);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // the first tick fires immediately; startup already synced
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = sync.sync().await {
                warn!("Scheduled sync failed: {}", e);
            }
        }
    })
}
