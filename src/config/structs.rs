use serde::Deserialize;

use crate::errors::{Result, ShortenerError};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub stores: StoreConfig,
    pub source: SourceConfig,
    pub statistics: StatisticsConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Connection strings for the two Redis logical databases: one holds the
/// short -> target mapping, the other the usage counters and target index.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub mapping_url: String,
    pub statistics_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            mapping_url: "redis://127.0.0.1:6379/0".to_string(),
            statistics_url: "redis://127.0.0.1:6379/1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Local path or absolute URL of the short link JSON document.
    pub location: String,
    /// Hours between scheduled syncs.
    pub refresh_interval_hours: u64,
    /// Timeout for remote source fetches, in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            location: "./url.json".to_string(),
            refresh_interval_hours: 6,
            fetch_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Days a usage counter is kept; also the metrics reporting period and
    /// the denominator of the per-day averages.
    pub retention_days: i64,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        // three weeks
        Self { retention_days: 21 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.statistics.retention_days <= 0 {
            return Err(ShortenerError::config(format!(
                "statistics.retention_days must be positive, got {}",
                self.statistics.retention_days
            )));
        }
        if self.source.refresh_interval_hours == 0 {
            return Err(ShortenerError::config(
                "source.refresh_interval_hours must be positive",
            ));
        }
        if self.source.location.trim().is_empty() {
            return Err(ShortenerError::config("source.location must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_retention_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.statistics.retention_days = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_refresh_interval_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.source.refresh_interval_hours = 0;
        assert!(cfg.validate().is_err());
    }
}
