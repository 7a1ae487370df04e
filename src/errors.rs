use std::fmt;

#[derive(Debug, Clone)]
pub enum ShortenerError {
    Cooldown(String),
    NotFound(String),
    UrlFileNotFound(String),
    UrlFileRecoveryFailed(String),
    UrlFileInvalidJson(String),
    UrlFileInvalidSchema(String),
    SyncDb(String),
    StoreOperation(String),
    Config(String),
}

impl ShortenerError {
    pub fn code(&self) -> &'static str {
        match self {
            ShortenerError::Cooldown(_) => "E001",
            ShortenerError::NotFound(_) => "E002",
            ShortenerError::UrlFileNotFound(_) => "E003",
            ShortenerError::UrlFileRecoveryFailed(_) => "E004",
            ShortenerError::UrlFileInvalidJson(_) => "E005",
            ShortenerError::UrlFileInvalidSchema(_) => "E006",
            ShortenerError::SyncDb(_) => "E007",
            ShortenerError::StoreOperation(_) => "E008",
            ShortenerError::Config(_) => "E009",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ShortenerError::Cooldown(_) => "Cooldown Active",
            ShortenerError::NotFound(_) => "Short Link Not Found",
            ShortenerError::UrlFileNotFound(_) => "Url File Not Found",
            ShortenerError::UrlFileRecoveryFailed(_) => "Url File Recovery Failed",
            ShortenerError::UrlFileInvalidJson(_) => "Url File Invalid JSON",
            ShortenerError::UrlFileInvalidSchema(_) => "Url File Invalid Schema",
            ShortenerError::SyncDb(_) => "Sync Database Error",
            ShortenerError::StoreOperation(_) => "Store Operation Error",
            ShortenerError::Config(_) => "Configuration Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ShortenerError::Cooldown(msg) => msg,
            ShortenerError::NotFound(msg) => msg,
            ShortenerError::UrlFileNotFound(msg) => msg,
            ShortenerError::UrlFileRecoveryFailed(msg) => msg,
            ShortenerError::UrlFileInvalidJson(msg) => msg,
            ShortenerError::UrlFileInvalidSchema(msg) => msg,
            ShortenerError::SyncDb(msg) => msg,
            ShortenerError::StoreOperation(msg) => msg,
            ShortenerError::Config(msg) => msg,
        }
    }

    /// Whether this error belongs to the `SyncFailed` category, i.e. any of
    /// the failure modes of a sync run. Lets callers catch the whole category
    /// without matching every kind.
    pub fn is_sync_failure(&self) -> bool {
        matches!(
            self,
            ShortenerError::UrlFileNotFound(_)
                | ShortenerError::UrlFileRecoveryFailed(_)
                | ShortenerError::UrlFileInvalidJson(_)
                | ShortenerError::UrlFileInvalidSchema(_)
                | ShortenerError::SyncDb(_)
        )
    }
}

impl fmt::Display for ShortenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for ShortenerError {}

impl ShortenerError {
    pub fn cooldown<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Cooldown(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ShortenerError::NotFound(msg.into())
    }

    pub fn url_file_not_found<T: Into<String>>(msg: T) -> Self {
        ShortenerError::UrlFileNotFound(msg.into())
    }

    pub fn url_file_recovery_failed<T: Into<String>>(msg: T) -> Self {
        ShortenerError::UrlFileRecoveryFailed(msg.into())
    }

    pub fn url_file_invalid_json<T: Into<String>>(msg: T) -> Self {
        ShortenerError::UrlFileInvalidJson(msg.into())
    }

    pub fn url_file_invalid_schema<T: Into<String>>(msg: T) -> Self {
        ShortenerError::UrlFileInvalidSchema(msg.into())
    }

    pub fn sync_db<T: Into<String>>(msg: T) -> Self {
        ShortenerError::SyncDb(msg.into())
    }

    pub fn store_operation<T: Into<String>>(msg: T) -> Self {
        ShortenerError::StoreOperation(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        ShortenerError::Config(msg.into())
    }
}

impl From<redis::RedisError> for ShortenerError {
    fn from(err: redis::RedisError) -> Self {
        ShortenerError::StoreOperation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShortenerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_category_covers_all_sync_kinds() {
        assert!(ShortenerError::url_file_not_found("x").is_sync_failure());
        assert!(ShortenerError::url_file_recovery_failed("x").is_sync_failure());
        assert!(ShortenerError::url_file_invalid_json("x").is_sync_failure());
        assert!(ShortenerError::url_file_invalid_schema("x").is_sync_failure());
        assert!(ShortenerError::sync_db("x").is_sync_failure());
        assert!(!ShortenerError::cooldown("x").is_sync_failure());
        assert!(!ShortenerError::not_found("x").is_sync_failure());
    }

    #[test]
    fn display_includes_type_and_message() {
        let err = ShortenerError::not_found("no mapping for abc");
        assert_eq!(err.to_string(), "Short Link Not Found: no mapping for abc");
        assert_eq!(err.code(), "E002");
    }
}
