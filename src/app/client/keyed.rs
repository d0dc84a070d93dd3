//! Keyed geocoding provider (OpenCage forward geocoding API)
//!
//! Requires an API key and accepts an ISO country-code hint. No client-side
//! pacing is applied unless a requests-per-second cap is configured.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::config::ClientConfig;
use super::http::HttpHandler;
use super::GeocodeProvider;
use crate::app::models::{GeocodeResult, ProviderKind};
use crate::constants::providers;
use crate::errors::{ProviderError, ProviderResult};

#[derive(Debug, Deserialize)]
struct KeyedResponse {
    #[serde(default)]
    results: Vec<KeyedResult>,
}

#[derive(Debug, Deserialize)]
struct KeyedResult {
    geometry: KeyedGeometry,
}

#[derive(Debug, Deserialize)]
struct KeyedGeometry {
    lat: f64,
    lng: f64,
}

/// Credentialed provider client
#[derive(Debug)]
pub struct KeyedProvider {
    http: HttpHandler,
    base_url: Url,
    api_key: String,
}

impl KeyedProvider {
    /// Create a keyed provider
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::MissingCredential` for an empty key,
    /// `ProviderError::InvalidUrl` for a bad endpoint, or a transport error if
    /// the HTTP client cannot be built
    pub fn new(
        config: &ClientConfig,
        base_url: &str,
        api_key: impl Into<String>,
    ) -> ProviderResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredential);
        }

        let base_url = Url::parse(base_url).map_err(|e| ProviderError::InvalidUrl {
            url: base_url.to_string(),
            error: e.to_string(),
        })?;

        let client = config.build_http_client()?;
        let http = HttpHandler::new(client, config.keyed_rate_limit_rps, config.request_timeout)?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.trim().to_string(),
        })
    }

    fn request_url(&self, query: &str, country_hint: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", query)
                .append_pair("key", &self.api_key)
                .append_pair("limit", providers::RESULT_LIMIT)
                .append_pair("no_annotations", "1");
            if let Some(code) = country_hint {
                pairs.append_pair("countrycode", &code.to_ascii_lowercase());
            }
        }
        url
    }
}

#[async_trait]
impl GeocodeProvider for KeyedProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Keyed
    }

    async fn resolve(
        &self,
        query: &str,
        country_hint: Option<&str>,
    ) -> ProviderResult<Option<GeocodeResult>> {
        let url = self.request_url(query, country_hint);
        let response: KeyedResponse = self.http.get_json(&url).await?;

        let result = response.results.into_iter().next().and_then(|result| {
            let KeyedGeometry { lat, lng } = result.geometry;
            (lat.is_finite() && lng.is_finite())
                .then(|| GeocodeResult::new(lat, lng, ProviderKind::Keyed))
        });

        debug!(
            "Keyed lookup '{}' (hint {:?}): {}",
            query,
            country_hint,
            if result.is_some() { "found" } else { "no result" }
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> KeyedProvider {
        KeyedProvider::new(
            &ClientConfig::default(),
            providers::KEYED_BASE_URL,
            "test-key",
        )
        .unwrap()
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let result = KeyedProvider::new(&ClientConfig::default(), providers::KEYED_BASE_URL, "  ");
        assert!(matches!(result, Err(ProviderError::MissingCredential)));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = KeyedProvider::new(&ClientConfig::default(), "not a url", "key");
        assert!(matches!(result, Err(ProviderError::InvalidUrl { .. })));
    }

    #[test]
    fn test_request_url_includes_hint() {
        let url = provider().request_url("Berlin, Germany", Some("DE"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert!(pairs.contains(&("q".to_string(), "Berlin, Germany".to_string())));
        assert!(pairs.contains(&("key".to_string(), "test-key".to_string())));
        assert!(pairs.contains(&("countrycode".to_string(), "de".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "1".to_string())));
    }

    #[test]
    fn test_request_url_without_hint() {
        let url = provider().request_url("Berlin", None);
        assert!(!url.query_pairs().any(|(k, _)| k == "countrycode"));
    }

    #[test]
    fn test_response_parsing() {
        let response: KeyedResponse = serde_json::from_str(
            r#"{"results": [{"geometry": {"lat": 52.52, "lng": 13.405}, "formatted": "Berlin"}],
                "status": {"code": 200}}"#,
        )
        .unwrap();
        assert_eq!(response.results[0].geometry.lat, 52.52);

        let empty: KeyedResponse = serde_json::from_str(r#"{"status": {"code": 200}}"#).unwrap();
        assert!(empty.results.is_empty());
    }
}
