//! Core application logic for City Geocoder
//!
//! This module contains the geocoding pipeline: data models, catalog loading,
//! the persistent cache, provider clients, the resolution policy, and the
//! worker/coordinator orchestration that ties them together.
//!
//! # Examples
//!
//! ```rust,no_run
//! use city_geocoder::app::{
//!     select_provider, ClientConfig, Coordinator, CoordinatorConfig, ProvidersConfig, Resolver,
//!     RetryPolicy,
//! };
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api_key = std::env::var("OPENCAGE_API_KEY").ok();
//! let provider = select_provider(
//!     &ClientConfig::default(),
//!     &ProvidersConfig::default(),
//!     api_key.as_deref(),
//! )?;
//!
//! let coordinator = Coordinator::new(
//!     CoordinatorConfig::default(),
//!     Resolver::new(provider, RetryPolicy::default()),
//! );
//! let result = coordinator
//!     .run_pipeline(
//!         Path::new("data/cities.json"),
//!         Path::new("data/geocode-cache.json"),
//!         Path::new("data/cities-geocoded.json"),
//!     )
//!     .await?;
//! println!("{}", result.stats.summary_line());
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod cache;
pub mod catalog;
pub mod client;
pub mod coordinator;
pub mod models;
pub mod persist;
pub mod queue;
pub mod resolver;
pub mod retry;
pub mod worker;

// Re-export main public API
pub use aggregator::{write_output, ResultAggregator, RunStats};
pub use cache::{CacheRecord, CacheStore, CacheSummary};
pub use catalog::{load_catalog, read_catalog, WorkList};
pub use client::{
    select_provider, ClientConfig, GeocodeProvider, KeyedProvider, ProvidersConfig,
    UnkeyedProvider,
};
pub use coordinator::{
    Coordinator, CoordinatorConfig, ProgressEvent, ProgressReporter, RunPlan, SessionResult,
};
pub use models::{
    normalize_place_name, Coordinate, GeocodeResult, GeocodedCatalog, PlaceCatalog, PlaceKey,
    ProviderKind, ResolvedCity, WorkItem,
};
pub use queue::WorkQueue;
pub use resolver::{QueryStage, Resolution, Resolver};
pub use retry::{RetryPolicy, Retryable};
pub use worker::{TaskOutcome, WorkerPool};
