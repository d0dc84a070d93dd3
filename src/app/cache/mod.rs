//! Durable geocode cache
//!
//! The cache maps a composite place key (`"<country>::<city>"`) to a resolved
//! coordinate and is what makes runs resumable: any key present in the loaded
//! cache is never sent to a provider again.
//!
//! # Examples
//!
//! ```rust,no_run
//! use city_geocoder::app::cache::CacheStore;
//! use city_geocoder::app::models::{Coordinate, PlaceKey};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut cache = CacheStore::load("data/geocode-cache.json").await;
//!
//! let key = PlaceKey::new("Germany", "Berlin");
//! if cache.get(&key).is_none() {
//!     cache.put(key, Coordinate::new(52.52, 13.405));
//! }
//!
//! cache.persist().await?;
//! # Ok(())
//! # }
//! ```

pub mod store;

pub use store::{CacheRecord, CacheStore, CacheSummary};
