//! Geocoding provider clients
//!
//! Both backends implement [`GeocodeProvider`], so the pipeline is written once
//! against the trait and the backend is chosen once per run:
//!
//! - `config`: HTTP client and provider endpoint settings
//! - `http`: JSON GET with rate limiting and post-call cooldown
//! - `keyed`: credentialed backend with country-code hints
//! - `unkeyed`: public backend paced to its usage policy
//! - `country_codes`: static country name to ISO code table

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::app::models::{GeocodeResult, ProviderKind};
use crate::errors::ProviderResult;

pub mod config;
pub mod country_codes;
pub mod http;
pub mod keyed;
pub mod unkeyed;

pub use config::{ClientConfig, ProvidersConfig};
pub use country_codes::country_code;
pub use http::{Cooldown, HttpHandler};
pub use keyed::KeyedProvider;
pub use unkeyed::UnkeyedProvider;

/// Capability shared by all geocoding backends
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Which backend this is
    fn kind(&self) -> ProviderKind;

    /// Resolve a free-form place query to at most one coordinate
    ///
    /// `Ok(None)` means the provider answered but found nothing. Backends that
    /// do not support country hints ignore `country_hint`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` when the call itself fails
    async fn resolve(
        &self,
        query: &str,
        country_hint: Option<&str>,
    ) -> ProviderResult<Option<GeocodeResult>>;
}

/// Choose the backend for a run
///
/// A non-empty credential selects the keyed provider for every task;
/// otherwise every task uses the unkeyed provider.
///
/// # Errors
///
/// Returns `ProviderError` if the selected provider cannot be constructed
pub fn select_provider(
    client: &ClientConfig,
    providers: &ProvidersConfig,
    api_key: Option<&str>,
) -> ProviderResult<Arc<dyn GeocodeProvider>> {
    match api_key.map(str::trim).filter(|key| !key.is_empty()) {
        Some(key) => {
            info!("Using keyed geocoding provider");
            Ok(Arc::new(KeyedProvider::new(
                client,
                &providers.keyed_base_url,
                key,
            )?))
        }
        None => {
            info!(
                "No API key configured, using unkeyed geocoding provider ({}ms between calls)",
                client.unkeyed_min_interval.as_millis()
            );
            Ok(Arc::new(UnkeyedProvider::new(
                client,
                &providers.unkeyed_base_url,
            )?))
        }
    }
}
