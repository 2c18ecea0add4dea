//! Per-IP request throttling.
//!
//! Sliding-window rate limiting over in-memory storage (DashMap), suitable
//! for a single-instance deployment. Two scopes cover the abuse-prone
//! surfaces: business search and review submission. Ceilings come from the
//! environment with conservative defaults.

use std::env;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use once_cell::sync::Lazy;

/// Global rate limiter instance
static RATE_LIMITER: Lazy<RateLimiter> = Lazy::new(RateLimiter::new);

/// Ceilings loaded once at first use
static LIMITS: Lazy<Limits> = Lazy::new(Limits::from_env);

/// Request ceilings per scope
#[derive(Debug, Clone)]
struct Limits {
    search_max: usize,
    search_window: Duration,
    review_max: usize,
    review_window: Duration,
}

impl Limits {
    fn from_env() -> Self {
        Self {
            search_max: env_parse("RATE_LIMIT_SEARCH_MAX", 30),
            search_window: Duration::from_secs(env_parse("RATE_LIMIT_SEARCH_WINDOW_SECONDS", 60)),
            review_max: env_parse("RATE_LIMIT_REVIEW_MAX", 5),
            review_window: Duration::from_secs(env_parse("RATE_LIMIT_REVIEW_WINDOW_SECONDS", 300)),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Error returned when a window is exhausted
#[derive(Debug, Clone)]
pub struct RateLimitExceeded {
    /// Seconds until the oldest tracked request leaves the window
    pub retry_after_seconds: u64,
}

/// Rate limiter using in-memory storage
pub struct RateLimiter {
    /// Map of (scope:identifier) -> request timestamps
    requests: DashMap<String, Vec<Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            requests: DashMap::new(),
        }
    }

    /// Check whether another request fits in the window.
    ///
    /// Returns `Ok(())` and records the request when allowed, or
    /// `Err(RateLimitExceeded)` with a retry hint when the ceiling is hit.
    pub fn check(
        &self,
        scope: &str,
        identifier: &str,
        max_requests: usize,
        window: Duration,
    ) -> Result<(), RateLimitExceeded> {
        let key = format!("{}:{}", scope, identifier);
        let now = Instant::now();

        let mut entry = self.requests.entry(key).or_default();

        // Slide the window: drop requests that have aged out.
        entry.retain(|&timestamp| now.duration_since(timestamp) < window);

        if entry.len() >= max_requests {
            let retry_after = entry
                .first()
                .map(|&oldest| window.saturating_sub(now.duration_since(oldest)))
                .unwrap_or(window);
            return Err(RateLimitExceeded {
                retry_after_seconds: retry_after.as_secs() + 1, // round up
            });
        }

        entry.push(now);
        Ok(())
    }

    /// Drop keys whose most recent request is older than `max_window`.
    /// Called periodically so idle clients do not accumulate forever.
    pub fn cleanup_old_entries(&self, max_window: Duration) {
        let now = Instant::now();
        self.requests.retain(|_, timestamps| {
            timestamps
                .last()
                .is_some_and(|&latest| now.duration_since(latest) < max_window)
        });
    }

    /// Number of tracked keys (for monitoring/debugging)
    pub fn tracked_keys_count(&self) -> usize {
        self.requests.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Throttle business searches for one client
pub fn check_search(identifier: &str) -> Result<(), RateLimitExceeded> {
    RATE_LIMITER.check("search", identifier, LIMITS.search_max, LIMITS.search_window)
}

/// Throttle review submissions for one client
pub fn check_review_submission(identifier: &str) -> Result<(), RateLimitExceeded> {
    RATE_LIMITER.check("review", identifier, LIMITS.review_max, LIMITS.review_window)
}

/// Periodic maintenance entry point for the global limiter
pub fn cleanup() {
    let max_window = LIMITS.search_window.max(LIMITS.review_window);
    RATE_LIMITER.cleanup_old_entries(max_window);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_requests_within_limit() {
        let limiter = RateLimiter::new();
        for i in 0..3 {
            assert!(
                limiter
                    .check("test", "client1", 3, Duration::from_secs(10))
                    .is_ok(),
                "request {} should be allowed",
                i
            );
        }
    }

    #[test]
    fn blocks_requests_over_limit() {
        let limiter = RateLimiter::new();
        for _ in 0..3 {
            limiter
                .check("test", "client1", 3, Duration::from_secs(10))
                .unwrap();
        }

        let result = limiter.check("test", "client1", 3, Duration::from_secs(10));
        assert!(result.is_err(), "4th request should be blocked");
        if let Err(err) = result {
            assert!(err.retry_after_seconds > 0, "should carry a retry hint");
        }
    }

    #[test]
    fn different_identifiers_are_independent() {
        let limiter = RateLimiter::new();
        for _ in 0..3 {
            limiter
                .check("test", "client1", 3, Duration::from_secs(10))
                .unwrap();
        }
        assert!(limiter
            .check("test", "client2", 3, Duration::from_secs(10))
            .is_ok());
    }

    #[test]
    fn different_scopes_are_independent() {
        let limiter = RateLimiter::new();
        for _ in 0..2 {
            limiter
                .check("search", "client1", 2, Duration::from_secs(10))
                .unwrap();
        }
        assert!(limiter
            .check("review", "client1", 2, Duration::from_secs(10))
            .is_ok());
    }

    #[test]
    fn window_expiry_frees_capacity() {
        let limiter = RateLimiter::new();
        let window = Duration::from_millis(50);
        for _ in 0..2 {
            limiter.check("test", "client1", 2, window).unwrap();
        }
        assert!(limiter.check("test", "client1", 2, window).is_err());

        std::thread::sleep(Duration::from_millis(60));
        assert!(
            limiter.check("test", "client1", 2, window).is_ok(),
            "expired requests should no longer count"
        );
    }

    #[test]
    fn cleanup_drops_only_stale_keys() {
        let limiter = RateLimiter::new();
        limiter
            .check("test", "client1", 10, Duration::from_secs(10))
            .unwrap();
        limiter
            .check("test", "client2", 10, Duration::from_secs(10))
            .unwrap();
        assert_eq!(limiter.tracked_keys_count(), 2);

        limiter.cleanup_old_entries(Duration::from_secs(10));
        assert_eq!(limiter.tracked_keys_count(), 2);

        std::thread::sleep(Duration::from_millis(20));
        limiter.cleanup_old_entries(Duration::from_millis(10));
        assert_eq!(limiter.tracked_keys_count(), 0);
    }
}
