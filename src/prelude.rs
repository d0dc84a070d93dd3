//! Prelude module for City Geocoder Library
//!
//! Re-exports the items needed for typical library usage with a single
//! `use city_geocoder::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use city_geocoder::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::load(None).await?;
//!     let provider = select_provider(&config.client, &config.providers, None)?;
//!     let coordinator = Coordinator::new(
//!         config.coordinator.clone(),
//!         Resolver::new(provider, config.retry.clone()),
//!     );
//!
//!     let result = coordinator
//!         .run_pipeline(&config.paths.input, &config.paths.cache, &config.paths.output)
//!         .await?;
//!     println!("{}", result.stats.summary_line());
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Essential app components
pub use crate::app::{
    // Data types
    Coordinate,
    GeocodeResult,
    GeocodedCatalog,
    PlaceCatalog,
    PlaceKey,
    ProviderKind,
    ResolvedCity,
    WorkItem,
    WorkList,

    // Storage
    CacheStore,

    // Providers
    ClientConfig,
    GeocodeProvider,
    ProvidersConfig,
    select_provider,

    // Orchestration
    Coordinator,
    CoordinatorConfig,
    ProgressEvent,
    ProgressReporter,
    Resolver,
    RetryPolicy,
    RunStats,
    SessionResult,
};

pub use crate::auth::Credential;
pub use crate::config::AppConfig;

// Commonly used constants
pub use crate::constants::{ENV_API_KEY, KEYED_CONCURRENCY, UNKEYED_MIN_INTERVAL, USER_AGENT};

// Standard library re-exports that are commonly needed
pub use std::path::{Path, PathBuf};
pub use std::sync::Arc;

pub use tokio;
