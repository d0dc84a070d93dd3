//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP client
//! shared by both geocoding providers.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::{http, limits, providers};
use crate::errors::{ProviderError, ProviderResult};

/// Configuration for HTTP client and provider pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Request timeout; a timed out call counts as a provider error
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Connect timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Connection pool idle timeout
    #[serde(with = "humantime_serde")]
    pub pool_idle_timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
    /// Optional client-side cap for the keyed provider (requests per second)
    pub keyed_rate_limit_rps: Option<u32>,
    /// Pause enforced after every unkeyed provider call
    #[serde(with = "humantime_serde")]
    pub unkeyed_min_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            pool_idle_timeout: http::POOL_IDLE_TIMEOUT,
            user_agent: http::USER_AGENT.to_string(),
            keyed_rate_limit_rps: None,
            unkeyed_min_interval: limits::UNKEYED_MIN_INTERVAL,
        }
    }
}

impl ClientConfig {
    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> ProviderResult<Client> {
        Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .pool_idle_timeout(self.pool_idle_timeout)
            .user_agent(self.user_agent.as_str())
            .tcp_nodelay(true)
            .build()
            .map_err(ProviderError::Transport)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be zero".to_string());
        }
        if self.unkeyed_min_interval.is_zero() {
            return Err("Unkeyed provider interval cannot be zero".to_string());
        }
        if self.keyed_rate_limit_rps == Some(0) {
            return Err("Keyed rate limit must be non-zero when set".to_string());
        }
        if self.user_agent.trim().is_empty() {
            return Err("User agent cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Provider endpoints and credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Keyed provider endpoint
    pub keyed_base_url: String,
    /// Unkeyed provider endpoint
    pub unkeyed_base_url: String,
    /// Credential for the keyed provider; the environment takes precedence
    pub api_key: Option<String>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            keyed_base_url: providers::KEYED_BASE_URL.to_string(),
            unkeyed_base_url: providers::UNKEYED_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.unkeyed_min_interval, Duration::from_millis(1100));
        assert!(config.keyed_rate_limit_rps.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_client_config_validation() {
        let config = ClientConfig {
            keyed_rate_limit_rps: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            unkeyed_min_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_http_client_creation() {
        let config = ClientConfig {
            request_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        assert!(config.build_http_client().is_ok());
    }

    #[test]
    fn test_providers_config_default() {
        let config = ProvidersConfig::default();
        assert!(config.keyed_base_url.starts_with("https://"));
        assert!(config.unkeyed_base_url.starts_with("https://"));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_durations_parse_from_toml() {
        let config: ClientConfig = toml::from_str(
            r#"
            request_timeout = "30s"
            unkeyed_min_interval = "1500ms"
            "#,
        )
        .unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.unkeyed_min_interval, Duration::from_millis(1500));
        assert_eq!(config.connect_timeout, http::CONNECT_TIMEOUT);
    }
}
