//! Core HTTP operations with provider pacing
//!
//! This module provides the JSON GET used by both providers, with two optional
//! pacing mechanisms: a `governor` rate limiter that spaces out request starts,
//! and a [`Cooldown`] that serializes calls and enforces a pause after each one
//! regardless of its outcome.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::{clock::DefaultClock, state::InMemoryState, state::NotKeyed, Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::Instant;
use url::Url;

use crate::errors::{ProviderError, ProviderResult};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Serializes calls and enforces a minimum pause after each one
///
/// The pause is measured from the moment a call finishes, so slow responses
/// never shorten it.
#[derive(Debug)]
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

    /// Pause enforced after each call
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run `call` once the previous call's pause has elapsed
    pub async fn run<T, F, Fut>(&self, call: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let mut next_allowed = self.next_allowed.lock().await;
        if let Some(at) = *next_allowed {
            let now = Instant::now();
            if at > now {
                tracing::trace!("Cooling down for {}ms", (at - now).as_millis());
                tokio::time::sleep_until(at).await;
            }
        }

        let output = call().await;
        *next_allowed = Some(Instant::now() + self.interval);
        output
    }
}

/// HTTP operations handler with pacing
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    rate_limiter: Option<DirectRateLimiter>,
    cooldown: Option<Cooldown>,
    timeout: Duration,
}

impl HttpHandler {
    /// Creates a new HttpHandler with an optional requests-per-second cap
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Configuration` if `rate_limit_rps` is `Some(0)`
    pub fn new(
        client: Client,
        rate_limit_rps: Option<u32>,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        let rate_limiter = rate_limit_rps.map(Self::build_rate_limiter).transpose()?;
        Ok(Self {
            client,
            rate_limiter,
            cooldown: None,
            timeout,
        })
    }

    /// Enforce `interval` between the end of one call and the start of the next
    pub fn with_cooldown(mut self, interval: Duration) -> Self {
        self.cooldown = Some(Cooldown::new(interval));
        self
    }

    /// Builds the rate limiter with the specified rate limit
    fn build_rate_limiter(rate_limit_rps: u32) -> ProviderResult<DirectRateLimiter> {
        let rps = NonZeroU32::new(rate_limit_rps).ok_or_else(|| ProviderError::Configuration {
            reason: "Rate limit must be non-zero".to_string(),
        })?;
        Ok(RateLimiter::direct(Quota::per_second(rps)))
    }

    /// Fetch `url` and decode the JSON body
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` for transport failures, timeouts, non-success
    /// statuses and undecodable bodies
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> ProviderResult<T> {
        if let Some(rate_limiter) = &self.rate_limiter {
            rate_limiter.until_ready().await;
        }

        match &self.cooldown {
            Some(cooldown) => cooldown.run(|| self.send_json(url)).await,
            None => self.send_json(url).await,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, url: &Url) -> ProviderResult<T> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("Rate limited by provider (429)");
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                ProviderError::Decode {
                    reason: e.to_string(),
                }
            } else {
                self.map_transport_error(e)
            }
        })
    }

    fn map_transport_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            ProviderError::Transport(error.without_url())
        }
    }

    /// Pause enforced after each call, if any
    pub fn cooldown_interval(&self) -> Option<Duration> {
        self.cooldown.as_ref().map(Cooldown::interval)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::client::config::ClientConfig;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_rate_limiter_creation() {
        let rate_limiter = HttpHandler::build_rate_limiter(5).unwrap();
        rate_limiter.until_ready().await;
    }

    #[test]
    fn test_rate_limiter_zero_fails() {
        assert!(HttpHandler::build_rate_limiter(0).is_err());
    }

    #[test]
    fn test_http_handler_creation() {
        let config = ClientConfig::default();
        let client = config.build_http_client().unwrap();
        let handler = HttpHandler::new(client, None, config.request_timeout)
            .unwrap()
            .with_cooldown(Duration::from_millis(10));
        assert_eq!(handler.cooldown_interval(), Some(Duration::from_millis(10)));
    }

    #[tokio::test]
    async fn test_cooldown_spaces_consecutive_calls() {
        let cooldown = Cooldown::new(Duration::from_millis(50));
        let start = Instant::now();

        for _ in 0..3 {
            cooldown.run(|| async {}).await;
        }

        // Three calls need two full pauses between them
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_cooldown_serializes_concurrent_callers() {
        let cooldown = Arc::new(Cooldown::new(Duration::from_millis(30)));
        let start = Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let cooldown = cooldown.clone();
                tokio::spawn(async move { cooldown.run(|| async {}).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(start.elapsed() >= Duration::from_millis(60));
    }
}
