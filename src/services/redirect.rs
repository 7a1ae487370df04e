use std::sync::Arc;

use tracing::debug;

use crate::errors::{Result, ShortenerError};
use crate::storage::MappingStore;
use crate::utils::html_escape;

/// Short token lookup. Pure read, no side effects.
pub struct RedirectService {
    mapping: Arc<dyn MappingStore>,
}

impl RedirectService {
    pub fn new(mapping: Arc<dyn MappingStore>) -> Self {
        Self { mapping }
    }

    /// Returns the stored target URL for a short token, already
    /// entity-escaped at sync time.
    pub async fn get_url(&self, token: &str) -> Result<String> {
        let token = html_escape(token);

        debug!("try to find \"{}\"", token);

        if !self.mapping.exists(&token).await? {
            debug!("\"{}\" not found", token);
            return Err(ShortenerError::not_found(format!(
                "no mapping for \"{token}\""
            )));
        }

        self.mapping
            .get(&token)
            .await?
            .ok_or_else(|| ShortenerError::not_found(format!("no mapping for \"{token}\"")))
    }
}
