//! Per-place resolution policy
//!
//! A work item is first looked up with the compound `"City, Country"` query
//! plus a country-code hint. If that fails or finds nothing, exactly one
//! fallback lookup with the bare city name is made. Provider errors are logged
//! and absorbed here so a provider outage only accumulates misses.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::app::client::{country_code, GeocodeProvider};
use crate::app::models::{GeocodeResult, ProviderKind, WorkItem};
use crate::app::retry::RetryPolicy;
use crate::errors::ProviderResult;

/// Which query produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    /// `"City, Country"` with country hint
    Primary,
    /// Bare city name
    Fallback,
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Outcome of resolving one work item through a provider
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A coordinate was found
    Resolved {
        result: GeocodeResult,
        stage: QueryStage,
    },
    /// Both queries failed or found nothing
    Unresolved {
        /// Queries that ended in a provider error rather than "no result"
        provider_errors: u32,
    },
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }
}

/// Applies the primary/fallback policy through one provider
#[derive(Clone)]
pub struct Resolver {
    provider: Arc<dyn GeocodeProvider>,
    retry: RetryPolicy,
}

impl Resolver {
    pub fn new(provider: Arc<dyn GeocodeProvider>, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    /// Backend used by this resolver
    pub fn provider_kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    /// Resolve one work item; never fails
    pub async fn resolve(&self, item: &WorkItem) -> Resolution {
        let mut provider_errors = 0;

        let primary = item.primary_query();
        let hint = country_code(&item.country);
        match self.lookup(&primary, hint).await {
            Ok(Some(result)) => {
                return Resolution::Resolved {
                    result,
                    stage: QueryStage::Primary,
                };
            }
            Ok(None) => debug!("No result for '{}', trying bare city name", primary),
            Err(e) => {
                warn!("Lookup for '{}' failed: {}", primary, e);
                provider_errors += 1;
            }
        }

        let fallback = item.fallback_query();
        match self.lookup(fallback, None).await {
            Ok(Some(result)) => {
                debug!("Resolved {} via fallback query '{}'", item.key, fallback);
                Resolution::Resolved {
                    result,
                    stage: QueryStage::Fallback,
                }
            }
            Ok(None) => {
                debug!("No result for fallback query '{}'", fallback);
                Resolution::Unresolved { provider_errors }
            }
            Err(e) => {
                warn!("Fallback lookup for '{}' failed: {}", fallback, e);
                Resolution::Unresolved {
                    provider_errors: provider_errors + 1,
                }
            }
        }
    }

    async fn lookup(
        &self,
        query: &str,
        country_hint: Option<&str>,
    ) -> ProviderResult<Option<GeocodeResult>> {
        let label = format!("Lookup '{}'", query);
        self.retry
            .run(&label, || self.provider.resolve(query, country_hint))
            .await
    }
}
