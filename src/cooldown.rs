//! Minimum-interval guard for expensive operations
//!
//! The sync engine owns one of these to make sure a sync can run at most once
//! per interval, no matter how it is triggered (startup, scheduler, admin
//! endpoint).

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::errors::{Result, ShortenerError};

/// Rate limiter holding the earliest instant the guarded operation may run
/// again. The stamp is advanced *before* the operation executes, so a slow
/// run cannot be re-entered and a failing run still consumes the window.
pub struct Cooldown {
    interval: Duration,
    next_allowed: Mutex<Option<Instant>>,
}

impl Cooldown {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_allowed: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Checks and advances the stamp in one step. `name` only labels the
    /// error message.
    pub fn try_acquire(&self, name: &str) -> Result<()> {
        let mut next_allowed = self.next_allowed.lock();
        let now = Instant::now();

        if let Some(at) = *next_allowed {
            if now < at {
                return Err(ShortenerError::cooldown(format!(
                    "\"{}\" invoked again {:?} before its cooldown elapsed",
                    name,
                    at - now
                )));
            }
        }

        *next_allowed = Some(now + self.interval);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_acquire_passes_second_is_blocked() {
        let cooldown = Cooldown::new(Duration::from_secs(60));
        assert!(cooldown.try_acquire("sync").is_ok());
        let err = cooldown.try_acquire("sync").unwrap_err();
        assert!(matches!(err, ShortenerError::Cooldown(_)));
    }

    #[test]
    fn window_is_consumed_even_if_the_guarded_work_fails() {
        // The caller acquires first and only then does the work, so a failed
        // run must not re-open the window.
        let cooldown = Cooldown::new(Duration::from_secs(60));
        cooldown.try_acquire("sync").unwrap();
        // guarded work fails here; the next attempt is still blocked
        assert!(cooldown.try_acquire("sync").is_err());
    }

    #[test]
    fn zero_interval_never_blocks() {
        let cooldown = Cooldown::new(Duration::ZERO);
        assert!(cooldown.try_acquire("sync").is_ok());
        assert!(cooldown.try_acquire("sync").is_ok());
    }

    #[test]
    fn reopens_after_the_interval_elapses() {
        let cooldown = Cooldown::new(Duration::from_millis(10));
        cooldown.try_acquire("sync").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert!(cooldown.try_acquire("sync").is_ok());
    }
}
