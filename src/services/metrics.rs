//! Metrics aggregation over the statistics counters
//!
//! Reconstructs time series and rollups by scanning the statistics store.
//! A report key may be a target URL (fold over all of its short tokens) or a
//! single short token; the dispatch is target-index membership.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::Result;
use crate::services::statistics::DATE_FORMAT;
use crate::storage::{StatisticsStore, keys};

/// Reporting period: the moving retention window ending today.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Period {
    pub start: String,
    pub end: String,
    /// Window length in days; also the denominator of `per-day`.
    pub length: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DateMetrics {
    pub total: u64,
    #[serde(rename = "user-agent")]
    pub user_agent: BTreeMap<String, u64>,
}

/// Metrics of a single short token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShortMetrics {
    pub url: String,
    pub total: u64,
    #[serde(rename = "per-day")]
    pub per_day: f64,
    #[serde(rename = "user-agent")]
    pub user_agent: BTreeMap<String, u64>,
    pub date: BTreeMap<String, DateMetrics>,
}

/// Metrics of a target URL, folded over all of its short tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetMetrics {
    pub period: Period,
    pub url: String,
    pub total: u64,
    #[serde(rename = "per-day")]
    pub per_day: f64,
    #[serde(rename = "user-agent")]
    pub user_agent: BTreeMap<String, u64>,
    pub date: BTreeMap<String, DateMetrics>,
    pub short: Vec<ShortMetrics>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MetricsReport {
    // Target first: a target report is a superset of a short report, so
    // untagged deserialization must try it before the short shape.
    Target(TargetMetrics),
    Short {
        period: Period,
        #[serde(flatten)]
        metrics: ShortMetrics,
    },
}

pub struct MetricsService {
    statistics: Arc<dyn StatisticsStore>,
    retention_days: i64,
}

impl MetricsService {
    pub fn new(statistics: Arc<dyn StatisticsStore>, retention_days: i64) -> Self {
        Self {
            statistics,
            retention_days,
        }
    }

    fn period(&self) -> Period {
        let today = Local::now().date_naive();
        let start = today - chrono::Duration::days(self.retention_days);
        Period {
            start: start.format(DATE_FORMAT).to_string(),
            end: today.format(DATE_FORMAT).to_string(),
            length: self.retention_days,
        }
    }

    /// All target URLs with their short tokens, in no guaranteed order.
    pub async fn get_url_list(&self) -> Result<Vec<(String, Vec<String>)>> {
        let mut list = Vec::new();

        for key in self
            .statistics
            .scan_keys(&keys::target_index_pattern())
            .await?
        {
            let Some(target) = keys::target_from_index(&key) else {
                continue;
            };
            let shorts = self.statistics.set_members(&key).await?;
            list.push((target.to_string(), shorts));
        }

        Ok(list)
    }

    /// Builds the metrics report for a target URL or a short token.
    ///
    /// A key with no target-index entry is treated as a short token.
    pub async fn get_metrics(&self, url: &str) -> Result<MetricsReport> {
        let period = self.period();

        if !self.statistics.exists(&keys::target_index(url)).await? {
            debug!("\"{}\" is not a known target, reporting it as a short token", url);
            return Ok(MetricsReport::Short {
                period,
                metrics: self.metrics_for_short(url).await?,
            });
        }

        let mut report = TargetMetrics {
            period,
            url: url.to_string(),
            total: 0,
            per_day: 0.0,
            user_agent: BTreeMap::new(),
            date: BTreeMap::new(),
            short: Vec::new(),
        };

        for short in self
            .statistics
            .set_members(&keys::target_index(url))
            .await?
        {
            let short_metrics = self.metrics_for_short(&short).await?;

            report.total += short_metrics.total;
            merge_counts(&mut report.user_agent, &short_metrics.user_agent);

            for (date, day) in &short_metrics.date {
                let bucket = report.date.entry(date.clone()).or_default();
                bucket.total += day.total;
                merge_counts(&mut bucket.user_agent, &day.user_agent);
            }

            report.short.push(short_metrics);
        }

        report.per_day = report.total as f64 / self.retention_days as f64;
        Ok(MetricsReport::Target(report))
    }

    async fn metrics_for_short(&self, short: &str) -> Result<ShortMetrics> {
        let mut metrics = ShortMetrics {
            url: short.to_string(),
            total: 0,
            per_day: 0.0,
            user_agent: BTreeMap::new(),
            date: BTreeMap::new(),
        };

        for key in self
            .statistics
            .scan_keys(&keys::day_total_pattern(short))
            .await?
        {
            let Some(date) = keys::date_from_day_total(&key, short) else {
                continue;
            };
            let count = self.statistics.get_count(&key).await?.unwrap_or(0);
            metrics.date.insert(
                date.to_string(),
                DateMetrics {
                    total: count,
                    user_agent: BTreeMap::new(),
                },
            );
            metrics.total += count;
        }

        metrics.per_day = metrics.total as f64 / self.retention_days as f64;

        let dates: Vec<String> = metrics.date.keys().cloned().collect();
        for date in dates {
            for key in self
                .statistics
                .scan_keys(&keys::day_class_pattern(short, &date))
                .await?
            {
                let Some(class) = keys::class_from_day_class(&key, short, &date) else {
                    continue;
                };
                let count = self.statistics.get_count(&key).await?.unwrap_or(0);

                // each class key appears at most once per date scan
                *metrics.user_agent.entry(class.to_string()).or_insert(0) += count;
                if let Some(bucket) = metrics.date.get_mut(&date) {
                    *bucket.user_agent.entry(class.to_string()).or_insert(0) += count;
                }
            }
        }

        Ok(metrics)
    }
}

fn merge_counts(into: &mut BTreeMap<String, u64>, from: &BTreeMap<String, u64>) {
    for (key, count) in from {
        *into.entry(key.clone()).or_insert(0) += count;
    }
}
