//! Unkeyed public geocoding provider (Nominatim search API)
//!
//! The public instance's usage policy allows at most one request per second.
//! Every call, successful or not, is followed by an enforced pause before the
//! next call through the same provider is allowed to start.

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
struct UnkeyedPlace {
    lat: String,
    lon: String,
}

impl UnkeyedPlace {
    fn coordinates(&self) -> ProviderResult<(f64, f64)> {
        let parse = |value: &str| {
            value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ProviderError::Decode {
                    reason: format!("invalid coordinate value '{}'", value),
                })
        };
        Ok((parse(&self.lat)?, parse(&self.lon)?))
    }
}

/// Rate-limited public provider client
#[derive(Debug)]
pub struct UnkeyedProvider {
    http: HttpHandler,
    base_url: Url,
}

impl UnkeyedProvider {
    /// Create an unkeyed provider paced by `config.unkeyed_min_interval`
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InvalidUrl` for a bad endpoint, or a transport
    /// error if the HTTP client cannot be built
    pub fn new(config: &ClientConfig, base_url: &str) -> ProviderResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ProviderError::InvalidUrl {
            url: base_url.to_string(),
            error: e.to_string(),
        })?;

        let client = config.build_http_client()?;
        let http = HttpHandler::new(client, None, config.request_timeout)?
            .with_cooldown(config.unkeyed_min_interval);

        Ok(Self { http, base_url })
    }

    fn request_url(&self, query: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "jsonv2")
            .append_pair("limit", providers::RESULT_LIMIT);
        url
    }
}

#[async_trait]
impl GeocodeProvider for UnkeyedProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Unkeyed
    }

    async fn resolve(
        &self,
        query: &str,
        _country_hint: Option<&str>,
    ) -> ProviderResult<Option<GeocodeResult>> {
        let url = self.request_url(query);
        let places: Vec<UnkeyedPlace> = self.http.get_json(&url).await?;

        let result = match places.first() {
            Some(place) => {
                let (lat, lng) = place.coordinates()?;
                Some(GeocodeResult::new(lat, lng, ProviderKind::Unkeyed))
            }
            None => None,
        };

        debug!(
            "Unkeyed lookup '{}': {}",
            query,
            if result.is_some() { "found" } else { "no result" }
        );
        Ok(result)
    }
}
