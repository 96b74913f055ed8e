//! Client-side sliding-window throttling
//!
//! Each endpoint path keeps the timestamps of its recent requests. On every
//! check, timestamps older than the window are dropped before counting, so
//! the window slides with time rather than resetting on a tick.

use counsel_core::RateLimitConfig;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-endpoint sliding-window rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    requests: Arc<DashMap<String, VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            requests: Arc::new(DashMap::new()),
            max_requests,
            window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests as usize, config.window())
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a request to `endpoint` now, or refuse it if the window is full
    pub fn try_acquire(&self, endpoint: &str) -> bool {
        self.try_acquire_at(endpoint, Instant::now())
    }

    /// Record a request to `endpoint` at `now`, or refuse it if the window is full.
    /// Refused requests are not recorded.
    pub fn try_acquire_at(&self, endpoint: &str, now: Instant) -> bool {
        let mut recent = self.requests.entry(endpoint.to_string()).or_default();

        while let Some(oldest) = recent.front() {
            if now.saturating_duration_since(*oldest) < self.window {
                break;
            }
            recent.pop_front();
        }

        if recent.len() >= self.max_requests {
            tracing::warn!("Rate limit exceeded for {endpoint}");
            return false;
        }

        recent.push_back(now);
        true
    }

    /// Requests to `endpoint` currently counted against the window
    pub fn in_window(&self, endpoint: &str) -> usize {
        self.requests.get(endpoint).map_or(0, |recent| recent.len())
    }

    /// Forget all recorded requests
    pub fn reset(&self) {
        self.requests.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_within_window() {
        let limiter = RateLimiter::new(60, Duration::from_secs(60));
        let start = Instant::now();

        for i in 0..60 {
            assert!(limiter.try_acquire_at("/cases", start + Duration::from_millis(i * 10)));
        }
        assert!(!limiter.try_acquire_at("/cases", start + Duration::from_secs(1)));
        assert_eq!(limiter.in_window("/cases"), 60);
    }

    #[test]
    fn test_endpoints_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.try_acquire_at("/a", now));
        assert!(!limiter.try_acquire_at("/a", now));
        assert!(limiter.try_acquire_at("/b", now));
    }

    #[test]
    fn test_window_slides() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.try_acquire_at("/x", start));
        assert!(limiter.try_acquire_at("/x", start + Duration::from_secs(30)));
        assert!(!limiter.try_acquire_at("/x", start + Duration::from_secs(59)));

        // First request has aged out; the second is still inside the window
        assert!(limiter.try_acquire_at("/x", start + Duration::from_secs(60)));
        assert!(!limiter.try_acquire_at("/x", start + Duration::from_secs(61)));

        assert!(limiter.try_acquire_at("/x", start + Duration::from_secs(150)));
        assert_eq!(limiter.in_window("/x"), 1);
    }

    #[test]
    fn test_reset_forgets_history() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.try_acquire("/x"));
        assert!(!limiter.try_acquire("/x"));
        limiter.reset();
        assert!(limiter.try_acquire("/x"));
    }
}
