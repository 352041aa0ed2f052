//! Login rate limiting
//!
//! Failed login attempts are tracked per e-mail address in a sliding window.
//! Once the limit is reached further attempts are refused until the oldest
//! failure leaves the window; a successful login clears the entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use crate::config::settings::RateLimitConfig;
use crate::utils::errors::{BloodLinkError, Result};

/// Failures recorded for one key
#[derive(Debug, Clone, Default)]
struct FailureEntry {
    failures: Vec<Instant>,
}

impl FailureEntry {
    /// Drop failures outside the window
    fn cleanup(&mut self, window: Duration, now: Instant) {
        self.failures.retain(|&at| now.duration_since(at) < window);
    }
}

/// Current limiter state for a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub failures: u32,
    pub remaining: u32,
    pub blocked: bool,
}

#[derive(Clone, Debug)]
pub struct LoginRateLimiter {
    max_attempts: u32,
    window: Duration,
    entries: Arc<Mutex<HashMap<String, FailureEntry>>>,
}

impl LoginRateLimiter {
    /// Create a new LoginRateLimiter instance
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            max_attempts: config.max_login_attempts,
            window: Duration::from_secs(config.window_seconds),
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, FailureEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Refuse the attempt when `key` has too many recent failures
    pub fn check(&self, key: &str) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.lock();

        if let Some(entry) = entries.get_mut(key) {
            entry.cleanup(self.window, now);
            if entry.failures.len() as u32 >= self.max_attempts {
                warn!(key = key, failures = entry.failures.len(), "Login rate limit exceeded");
                return Err(BloodLinkError::RateLimitExceeded);
            }
        }

        Ok(())
    }

    /// Record a failed attempt
    pub fn record_failure(&self, key: &str) {
        let now = Instant::now();
        let mut entries = self.lock();
        let entry = entries.entry(key.to_string()).or_default();
        entry.cleanup(self.window, now);
        entry.failures.push(now);
        debug!(key = key, failures = entry.failures.len(), "Login failure recorded");
    }

    /// Forget failures after a successful login
    pub fn reset(&self, key: &str) {
        self.lock().remove(key);
    }

    /// Current status for a key
    pub fn status(&self, key: &str) -> RateLimitStatus {
        let now = Instant::now();
        let failures = self.lock()
            .get(key)
            .map(|entry| entry.failures.iter().filter(|&&at| now.duration_since(at) < self.window).count() as u32)
            .unwrap_or(0);

        RateLimitStatus {
            failures,
            remaining: self.max_attempts.saturating_sub(failures),
            blocked: failures >= self.max_attempts,
        }
    }

    /// Number of keys currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    /// Remove entries with no failures left in the window
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();

        entries.retain(|_, entry| {
            entry.cleanup(self.window, now);
            !entry.failures.is_empty()
        });

        before - entries.len()
    }

    /// Start a background task that prunes stale entries every `interval`
    pub fn start_cleanup(&self, interval: Duration) -> JoinHandle<()> {
        let limiter = self.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            loop {
                ticker.tick().await;

                let removed = limiter.cleanup();
                if removed > 0 {
                    debug!(removed = removed, "Cleaned up login rate limit entries");
                }
            }
        });

        info!("Started login rate limit cleanup with interval {:?}", interval);
        handle
    }
}
