//! Sync engine integration tests against the in-memory backends.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use simpleshortener::errors::ShortenerError;
use simpleshortener::services::{RedirectService, SyncService};
use simpleshortener::storage::{
    MappingStore, MemoryMappingStore, MemoryStatisticsStore, StatisticsStore,
};

fn write_source(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

struct Harness {
    mapping: Arc<MemoryMappingStore>,
    statistics: Arc<MemoryStatisticsStore>,
}

impl Harness {
    fn new() -> Self {
        Self {
            mapping: Arc::new(MemoryMappingStore::new()),
            statistics: Arc::new(MemoryStatisticsStore::new()),
        }
    }

    fn sync_service(&self, location: &str) -> SyncService {
        SyncService::new(
            location,
            self.mapping.clone() as Arc<dyn MappingStore>,
            self.statistics.clone() as Arc<dyn StatisticsStore>,
        )
        .with_cooldown(Duration::ZERO)
    }
}

const SOURCE: &str = r#"[
    {"target": "https://gitlab.org", "short": ["gtlb", "gl"]},
    {"target": "https://example.com/?a=1&b=2", "short": ["ex"]}
]"#;

#[tokio::test]
async fn sync_populates_mapping_and_index() {
    let harness = Harness::new();
    let file = write_source(SOURCE);
    let sync = harness.sync_service(file.path().to_str().unwrap());

    sync.sync().await.unwrap();

    let resolver = RedirectService::new(harness.mapping.clone() as Arc<dyn MappingStore>);
    assert_eq!(resolver.get_url("gtlb").await.unwrap(), "https://gitlab.org");
    assert_eq!(resolver.get_url("gl").await.unwrap(), "https://gitlab.org");
    // targets are entity-escaped at write time
    assert_eq!(
        resolver.get_url("ex").await.unwrap(),
        "https://example.com/?a=1&amp;b=2"
    );

    let members = harness
        .statistics
        .set_members("target:https://gitlab.org")
        .await
        .unwrap();
    assert_eq!(members, vec!["gl".to_string(), "gtlb".to_string()]);
}

#[tokio::test]
async fn resync_replaces_the_table_wholesale() {
    let harness = Harness::new();
    let file = write_source(SOURCE);
    let sync = harness.sync_service(file.path().to_str().unwrap());
    sync.sync().await.unwrap();

    let file = write_source(r#"[{"target": "https://rust-lang.org", "short": ["rs"]}]"#);
    let sync = harness.sync_service(file.path().to_str().unwrap());
    sync.sync().await.unwrap();

    let resolver = RedirectService::new(harness.mapping.clone() as Arc<dyn MappingStore>);
    assert_eq!(resolver.get_url("rs").await.unwrap(), "https://rust-lang.org");
    // nothing from the previous document stays resolvable
    assert!(matches!(
        resolver.get_url("gtlb").await,
        Err(ShortenerError::NotFound(_))
    ));

    // the target index is rebuilt alongside the table
    let stale = harness
        .statistics
        .set_members("target:https://gitlab.org")
        .await
        .unwrap();
    assert!(stale.is_empty());
}

#[tokio::test]
async fn second_sync_within_cooldown_is_rejected() {
    let harness = Harness::new();
    let file = write_source(SOURCE);
    let sync = SyncService::new(
        file.path().to_str().unwrap(),
        harness.mapping.clone() as Arc<dyn MappingStore>,
        harness.statistics.clone() as Arc<dyn StatisticsStore>,
    );

    sync.sync().await.unwrap();
    let err = sync.sync().await.unwrap_err();
    assert!(matches!(err, ShortenerError::Cooldown(_)));
    // the first run's state is untouched
    assert_eq!(harness.mapping.len(), 3);
}

#[tokio::test]
async fn missing_file_is_url_file_not_found() {
    let harness = Harness::new();
    let sync = harness.sync_service("./definitely-not-here.json");
    let err = sync.sync().await.unwrap_err();
    assert!(matches!(err, ShortenerError::UrlFileNotFound(_)));
    assert!(err.is_sync_failure());
}

#[tokio::test]
async fn invalid_json_leaves_the_previous_state_intact() {
    let harness = Harness::new();
    let file = write_source(SOURCE);
    harness
        .sync_service(file.path().to_str().unwrap())
        .sync()
        .await
        .unwrap();

    let broken = write_source("[{\"target\": ");
    let err = harness
        .sync_service(broken.path().to_str().unwrap())
        .sync()
        .await
        .unwrap_err();
    assert!(matches!(err, ShortenerError::UrlFileInvalidJson(_)));

    let resolver = RedirectService::new(harness.mapping.clone() as Arc<dyn MappingStore>);
    assert_eq!(resolver.get_url("gtlb").await.unwrap(), "https://gitlab.org");
}

#[tokio::test]
async fn invalid_schema_leaves_the_previous_state_intact() {
    let harness = Harness::new();
    let file = write_source(SOURCE);
    harness
        .sync_service(file.path().to_str().unwrap())
        .sync()
        .await
        .unwrap();

    // short must be a list of strings, not a string
    let broken = write_source(r#"[{"target": "https://a", "short": "abc"}]"#);
    let err = harness
        .sync_service(broken.path().to_str().unwrap())
        .sync()
        .await
        .unwrap_err();
    assert!(matches!(err, ShortenerError::UrlFileInvalidSchema(_)));
    assert_eq!(harness.mapping.len(), 3);
}

#[tokio::test]
async fn tokens_are_escaped_before_storage() {
    let harness = Harness::new();
    let file = write_source(r#"[{"target": "https://a", "short": ["<b>"]}]"#);
    harness
        .sync_service(file.path().to_str().unwrap())
        .sync()
        .await
        .unwrap();

    // the resolver escapes its input the same way, so the raw token still hits
    let resolver = RedirectService::new(harness.mapping.clone() as Arc<dyn MappingStore>);
    assert_eq!(resolver.get_url("<b>").await.unwrap(), "https://a");
    assert!(harness.mapping.get("&lt;b&gt;").await.unwrap().is_some());
    assert!(harness.mapping.get("<b>").await.unwrap().is_none());
}
