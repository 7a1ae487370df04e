//! Sync engine: wholesale replacement of the short link table
//!
//! A sync loads the source document, escapes every value and replaces both
//! the mapping table and the target index. Any failure leaves the previous
//! mapping state intact; the cooldown window is consumed either way.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument};

use crate::cooldown::Cooldown;
use crate::errors::{Result, ShortenerError};
use crate::source;
use crate::storage::{MappingStore, StatisticsStore, keys};
use crate::utils::html_escape;

const SYNC_COOLDOWN: Duration = Duration::from_secs(60);
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SyncService {
    location: String,
    mapping: Arc<dyn MappingStore>,
    statistics: Arc<dyn StatisticsStore>,
    cooldown: Cooldown,
    fetch_timeout: Duration,
}

impl SyncService {
    pub fn new(
        location: impl Into<String>,
        mapping: Arc<dyn MappingStore>,
        statistics: Arc<dyn StatisticsStore>,
    ) -> Self {
        Self {
            location: location.into(),
            mapping,
            statistics,
            cooldown: Cooldown::new(SYNC_COOLDOWN),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Overrides the 60 s minimum interval between syncs.
    pub fn with_cooldown(mut self, interval: Duration) -> Self {
        self.cooldown = Cooldown::new(interval);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Reloads the source document and replaces the mapping table and the
    /// target index.
    ///
    /// Fails with `Cooldown` when called again within the minimum interval,
    /// with one of the `UrlFile*` kinds when the document cannot be loaded
    /// or does not validate, and with `SyncDb` when a store commit fails.
    /// Every failure kind except `Cooldown` satisfies
    /// [`ShortenerError::is_sync_failure`].
    #[instrument(skip(self), fields(location = %self.location))]
    pub async fn sync(&self) -> Result<()> {
        self.cooldown.try_acquire("sync")?;

        info!("Try to load url list...");
        let records = source::load(&self.location, self.fetch_timeout).await?;

        let mut entries: Vec<(String, String)> = Vec::new();
        let mut index: Vec<(String, String)> = Vec::new();
        for record in &records {
            let target = html_escape(&record.target).into_owned();
            for short in &record.short {
                let short = html_escape(short).into_owned();
                index.push((keys::target_index(&target), short.clone()));
                entries.push((short, target.clone()));
            }
        }

        // The mapping table commits first; if the index commit then fails the
        // next successful sync repairs it. Each batch is atomic on its own.
        self.mapping
            .replace_all(&entries)
            .await
            .map_err(|e| ShortenerError::sync_db(e.message().to_string()))?;
        self.statistics
            .rebuild_index(&keys::target_index_pattern(), &index)
            .await
            .map_err(|e| ShortenerError::sync_db(e.message().to_string()))?;

        info!(
            "Sync was completed: {} targets, {} short links",
            records.len(),
            entries.len()
        );
        Ok(())
    }
}
