//! A per-client sliding window request limiter.

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
    time::{Duration, Instant},
};

use crate::Error;

/// How many requests a client may make within a window of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// The most requests accepted from one client per window.
    pub max_requests: usize,
    /// The length of the sliding window.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
        }
    }
}

/// Tracks when each client's accepted requests arrived.
///
/// A request is rejected when the client already has
/// [RateLimitConfig::max_requests] accepted requests inside the window.
/// Rejected requests do not count towards the limit.
#[derive(Debug, Default)]
pub struct RateLimiter {
    config: RateLimitConfig,
    clients: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    /// Create a limiter with no recorded requests.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// The limits this limiter enforces.
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Record a request from `client` arriving now.
    ///
    /// # Errors
    /// Returns [Error::TooManyRequests] if `client` has used up its allowance.
    pub fn check(&self, client: &str) -> Result<(), Error> {
        self.check_at(client, Instant::now())
    }

    /// Record a request from `client` arriving at `now`.
    ///
    /// Clients with no requests left in the window are forgotten.
    ///
    /// # Errors
    /// Returns [Error::TooManyRequests] if `client` has used up its allowance.
    pub fn check_at(&self, client: &str, now: Instant) -> Result<(), Error> {
        let mut clients = self.clients.lock().map_err(|error| {
            tracing::error!("could not acquire rate limiter lock: {error}");
            Error::Internal("rate limiter lock poisoned".to_owned())
        })?;

        let window = self.config.window;
        clients.retain(|_, requests| {
            while requests
                .front()
                .is_some_and(|&arrived| now.duration_since(arrived) >= window)
            {
                requests.pop_front();
            }

            !requests.is_empty()
        });

        let requests = clients.entry(client.to_owned()).or_default();

        if requests.len() >= self.config.max_requests {
            tracing::warn!("Rate limit exceeded for client {client}");
            return Err(Error::TooManyRequests);
        }

        requests.push_back(now);

        Ok(())
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.clients.lock().map(|clients| clients.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crate::Error;

    use super::{RateLimitConfig, RateLimiter};

    fn limiter(max_requests: usize) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
        })
    }

    #[test]
    fn rejects_requests_over_the_limit() {
        let limiter = limiter(2);
        let now = Instant::now();

        assert_eq!(limiter.check_at("a", now), Ok(()));
        assert_eq!(limiter.check_at("a", now), Ok(()));
        assert_eq!(limiter.check_at("a", now), Err(Error::TooManyRequests));
    }

    #[test]
    fn clients_are_limited_separately() {
        let limiter = limiter(1);
        let now = Instant::now();

        assert_eq!(limiter.check_at("a", now), Ok(()));
        assert_eq!(limiter.check_at("b", now), Ok(()));
        assert_eq!(limiter.check_at("a", now), Err(Error::TooManyRequests));
    }

    #[test]
    fn window_slides() {
        let limiter = limiter(1);
        let start = Instant::now();

        assert_eq!(limiter.check_at("a", start), Ok(()));
        assert_eq!(
            limiter.check_at("a", start + Duration::from_secs(59)),
            Err(Error::TooManyRequests)
        );
        assert_eq!(limiter.check_at("a", start + Duration::from_secs(60)), Ok(()));
    }

    #[test]
    fn forgets_idle_clients() {
        let limiter = limiter(5);
        let start = Instant::now();
        limiter.check_at("a", start).expect("first request is allowed");

        limiter
            .check_at("b", start + Duration::from_secs(61))
            .expect("first request is allowed");

        assert_eq!(limiter.tracked_clients(), 1);
    }
}
