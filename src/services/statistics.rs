use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tracing::debug;

use crate::errors::Result;
use crate::services::UserAgentClass;
use crate::storage::{StatisticsStore, keys};
use crate::utils::html_escape;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Records one redirect hit into the per-day counters.
pub struct StatisticsService {
    statistics: Arc<dyn StatisticsStore>,
    retention: Duration,
}

impl StatisticsService {
    pub fn new(statistics: Arc<dyn StatisticsStore>, retention_days: i64) -> Self {
        Self {
            statistics,
            retention: Duration::from_secs(retention_days.max(0) as u64 * 86_400),
        }
    }

    /// Increments the day total for the token, plus the per-class counter
    /// when a user-agent string is supplied. Both counters get their
    /// expiration pushed out to now + retention window, in one batched
    /// write.
    pub async fn update_url_statistics(
        &self,
        token: &str,
        user_agent: Option<&str>,
    ) -> Result<()> {
        let token = html_escape(token);
        let today = Local::now().date_naive().format(DATE_FORMAT).to_string();

        let mut counter_keys = vec![keys::day_total(&token, &today)];
        if let Some(ua) = user_agent {
            let class = UserAgentClass::classify(ua);
            debug!("\"{}\" hit classified as {}", token, class);
            counter_keys.push(keys::day_class(&token, &today, class.as_str()));
        }

        self.statistics
            .increment_all(&counter_keys, self.retention)
            .await
    }
}
