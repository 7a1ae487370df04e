mod metrics;
mod redirect;
mod statistics;
mod sync;
mod user_agent;

pub use metrics::{DateMetrics, MetricsReport, MetricsService, Period, ShortMetrics, TargetMetrics};
pub use redirect::RedirectService;
pub use statistics::StatisticsService;
pub use sync::SyncService;
pub use user_agent::UserAgentClass;
