mod structs;

pub use structs::{
    AppConfig, LogConfig, ServerConfig, SourceConfig, StatisticsConfig, StoreConfig,
};

use std::sync::{Arc, OnceLock};

use crate::errors::{Result, ShortenerError};

static CONFIG: OnceLock<Arc<AppConfig>> = OnceLock::new();

/// Get the global configuration instance.
///
/// Returns an Arc pointer to the configuration, which is cheap to clone.
pub fn get_config() -> Arc<AppConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
        .clone()
}

/// Initialize the global configuration.
///
/// Layers, lowest priority first: built-in defaults, an optional TOML file
/// (`config.toml` in the working directory unless a path is given), then
/// `SHORTENER_*` environment variables with `__` as the section separator,
/// e.g. `SHORTENER_STORES__MAPPING_URL`.
pub fn init_config(path: Option<&str>) -> Result<Arc<AppConfig>> {
    let loaded = config::Config::builder()
        .add_source(config::File::with_name(path.unwrap_or("config")).required(false))
        .add_source(
            config::Environment::with_prefix("SHORTENER")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .map_err(|e| ShortenerError::config(e.to_string()))?;

    let app: AppConfig = loaded
        .try_deserialize()
        .map_err(|e| ShortenerError::config(e.to_string()))?;
    app.validate()?;

    let arc = Arc::new(app);
    let _ = CONFIG.set(arc.clone());
    Ok(arc)
}
