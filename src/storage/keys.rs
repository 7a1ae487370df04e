//! Statistics key families
//!
//! Three key families live in the statistics store and are a stable contract
//! (persisted counters must stay readable across restarts):
//!
//! - `target:{target}` - set of short tokens for a target URL
//! - `short:{short}:date:{date}:total` - redirects per short per day
//! - `short:{short}:date:{date}:ua:{class}` - same, split by user-agent class
//!
//! Dates are formatted `%Y-%m-%d`.

const TARGET_PREFIX: &str = "target:";

pub fn target_index(target: &str) -> String {
    format!("{TARGET_PREFIX}{target}")
}

pub fn target_index_pattern() -> String {
    format!("{TARGET_PREFIX}*")
}

/// Recovers the target URL from a `target:{target}` key.
pub fn target_from_index(key: &str) -> Option<&str> {
    key.strip_prefix(TARGET_PREFIX)
}

pub fn day_total(short: &str, date: &str) -> String {
    format!("short:{short}:date:{date}:total")
}

pub fn day_total_pattern(short: &str) -> String {
    format!("short:{short}:date:*:total")
}

/// Recovers the date from a `short:{short}:date:{date}:total` key.
pub fn date_from_day_total<'a>(key: &'a str, short: &str) -> Option<&'a str> {
    key.strip_prefix(&format!("short:{short}:date:"))?
        .strip_suffix(":total")
}

pub fn day_class(short: &str, date: &str, class: &str) -> String {
    format!("short:{short}:date:{date}:ua:{class}")
}

pub fn day_class_pattern(short: &str, date: &str) -> String {
    format!("short:{short}:date:{date}:ua:*")
}

/// Recovers the user-agent class from a `short:{short}:date:{date}:ua:{class}` key.
pub fn class_from_day_class<'a>(key: &'a str, short: &str, date: &str) -> Option<&'a str> {
    key.strip_prefix(&format!("short:{short}:date:{date}:ua:"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_key_round_trips() {
        let key = target_index("https://example.com");
        assert_eq!(key, "target:https://example.com");
        assert_eq!(target_from_index(&key), Some("https://example.com"));
    }

    #[test]
    fn date_is_recovered_from_total_key() {
        let key = day_total("gtlb", "2026-08-29");
        assert_eq!(date_from_day_total(&key, "gtlb"), Some("2026-08-29"));
        assert_eq!(date_from_day_total(&key, "other"), None);
    }

    #[test]
    fn class_is_recovered_from_class_key() {
        let key = day_class("gtlb", "2026-08-29", "windows");
        assert_eq!(
            class_from_day_class(&key, "gtlb", "2026-08-29"),
            Some("windows")
        );
    }
}
