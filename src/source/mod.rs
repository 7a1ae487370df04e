//! Source document loading and validation
//!
//! The short link table comes from a JSON document shaped as
//! `[{"target": "...", "short": ["...", ...]}, ...]`, fetched either from a
//! local file or over HTTP. The whole document must validate; a single
//! malformed record rejects the load.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{Result, ShortenerError};

/// One entry of the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceRecord {
    pub target: String,
    pub short: Vec<String>,
}

/// Loads and validates the source document.
///
/// `location` is treated as remote when it parses as an absolute URL,
/// otherwise as a filesystem path.
pub async fn load(location: &str, fetch_timeout: Duration) -> Result<Vec<SourceRecord>> {
    let body = if is_remote(location) {
        fetch_remote(location, fetch_timeout).await?
    } else {
        read_local(location).await?
    };

    parse_records(&body)
}

fn is_remote(location: &str) -> bool {
    url::Url::parse(location).is_ok()
}

async fn read_local(path: &str) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(body) => Ok(body),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Failed to load the url list: file not found: {}", path);
            Err(ShortenerError::url_file_not_found(format!(
                "no such file: {path}"
            )))
        }
        Err(e) => {
            warn!("Failed to load the url list: {}", e);
            Err(ShortenerError::url_file_recovery_failed(e.to_string()))
        }
    }
}

async fn fetch_remote(url: &str, timeout: Duration) -> Result<String> {
    debug!("Fetching url list from {}", url);

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ShortenerError::url_file_recovery_failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        warn!("Failed to load the url list: an HTTP error has occurred: {}", e);
        ShortenerError::url_file_recovery_failed(e.to_string())
    })?;

    response
        .text()
        .await
        .map_err(|e| ShortenerError::url_file_recovery_failed(e.to_string()))
}

/// Two-phase parse so JSON syntax errors and schema mismatches stay
/// distinguishable.
fn parse_records(body: &str) -> Result<Vec<SourceRecord>> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        warn!("Failed to load the url list: failed to decode json");
        ShortenerError::url_file_invalid_json(e.to_string())
    })?;

    let records: Vec<SourceRecord> = serde_json::from_value(value).map_err(|e| {
        warn!("Failed to load the url list: invalid schema of the json");
        ShortenerError::url_file_invalid_schema(e.to_string())
    })?;

    if let Some(record) = records.iter().find(|r| r.short.is_empty()) {
        warn!("Failed to load the url list: invalid schema of the json");
        return Err(ShortenerError::url_file_invalid_schema(format!(
            "record for \"{}\" has an empty short list",
            record.target
        )));
    }

    Ok(records)
}
