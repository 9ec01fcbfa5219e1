//! Proxy representation and health state.

use governor::{clock::DefaultClock, middleware::NoOpMiddleware, state::{InMemoryState, NotKeyed}, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Upper bound of a proxy score.
pub const MAX_SCORE: i32 = 50;
/// Lower bound of a proxy score.
pub const MIN_SCORE: i32 = -50;

/// Per-proxy rate limiter.
pub type ProxyLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Representation of a proxy server.
#[derive(Debug, Clone)]
pub struct Proxy {
    /// The proxy address (e.g. "http://127.0.0.1:8080"). Unique within a pool.
    pub address: String,
    /// Set on the first success through this proxy and never cleared.
    pub is_working: bool,
    /// Reputation in `MIN_SCORE..=MAX_SCORE`.
    pub score: i32,
    /// Rate limiter to control requests per second, when configured.
    pub limiter: Option<Arc<ProxyLimiter>>,
}

impl Proxy {
    /// Create a fresh, untested proxy.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            is_working: false,
            score: 0,
            limiter: None,
        }
    }

    /// Create a fresh proxy limited to `max_rps` requests per second.
    pub fn with_rate_limit(address: impl Into<String>, max_rps: f64) -> Self {
        let rps = NonZeroU32::new(max_rps.ceil() as u32).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: Some(Arc::new(RateLimiter::direct(Quota::per_second(rps)))),
            ..Self::new(address)
        }
    }

    /// Raise the score by one and mark the proxy as working.
    pub fn add_success(&mut self) {
        self.score = (self.score + 1).clamp(MIN_SCORE, MAX_SCORE);
        self.is_working = true;
    }

    /// Lower the score by one.
    pub fn add_failure(&mut self) {
        self.score = (self.score - 1).clamp(MIN_SCORE, MAX_SCORE);
    }

    /// Wait until the rate limiter, if any, admits one more request.
    pub async fn until_ready(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_proxy_is_untested() {
        let proxy = Proxy::new("http://10.0.0.1:3128");
        assert_eq!(proxy.address, "http://10.0.0.1:3128");
        assert_eq!(proxy.score, 0);
        assert!(!proxy.is_working);
        assert!(proxy.limiter.is_none());
    }

    #[test]
    fn test_score_saturates_at_both_ends() {
        let mut proxy = Proxy::new("a");
        for _ in 0..120 {
            proxy.add_success();
        }
        assert_eq!(proxy.score, MAX_SCORE);

        for _ in 0..250 {
            proxy.add_failure();
        }
        assert_eq!(proxy.score, MIN_SCORE);

        proxy.add_success();
        assert_eq!(proxy.score, MIN_SCORE + 1);
    }

    #[test]
    fn test_working_flag_survives_failures() {
        let mut proxy = Proxy::new("a");
        proxy.add_failure();
        assert!(!proxy.is_working);

        proxy.add_success();
        for _ in 0..100 {
            proxy.add_failure();
        }
        assert!(proxy.is_working);
        assert_eq!(proxy.score, MIN_SCORE);
    }

    #[test]
    fn test_rate_limit_floor_is_one_per_second() {
        let proxy = Proxy::with_rate_limit("a", 0.0);
        let limiter = proxy.limiter.as_ref().unwrap();
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }

    #[tokio::test]
    async fn test_until_ready_without_limiter_returns() {
        Proxy::new("a").until_ready().await;
    }
}
