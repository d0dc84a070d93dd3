//! Data models for City Geocoder
//!
//! This module defines the core data structures used throughout the application,
//! including place keys, work items, coordinates and the catalog shapes that are
//! read from and written to disk.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::places;

/// Country name to city names, as produced by the catalog acquisition step
pub type PlaceCatalog = BTreeMap<String, Vec<String>>;

/// Country name to the cities that were resolved to coordinates
pub type GeocodedCatalog = BTreeMap<String, Vec<ResolvedCity>>;

/// Normalize a country or city display name
///
/// Strips surrounding whitespace and a trailing `(virtual)` qualifier, matched
/// case-insensitively. The result may be empty.
///
/// # Examples
///
/// ```
/// use city_geocoder::app::normalize_place_name;
///
/// assert_eq!(normalize_place_name("  Berlin (Virtual) "), "Berlin");
/// assert_eq!(normalize_place_name("São Paulo"), "São Paulo");
/// ```
pub fn normalize_place_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let qualifier = places::VIRTUAL_QUALIFIER;

    if trimmed.len() >= qualifier.len() {
        let split_at = trimmed.len() - qualifier.len();
        if trimmed.is_char_boundary(split_at)
            && trimmed[split_at..].eq_ignore_ascii_case(qualifier)
        {
            return trimmed[..split_at].trim_end().to_string();
        }
    }

    trimmed.to_string()
}

/// Composite cache key formed from a normalized country and city
///
/// Serialized as the bare `"<country>::<city>"` string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceKey(String);

impl PlaceKey {
    /// Build a key from already-normalized names
    pub fn new(country: &str, city: &str) -> Self {
        Self(format!("{}{}{}", country, places::KEY_SEPARATOR, city))
    }

    /// Build a key from raw display names, normalizing both parts first
    pub fn from_raw(country: &str, city: &str) -> Self {
        Self::new(&normalize_place_name(country), &normalize_place_name(city))
    }

    /// The key as stored in the cache file
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PlaceKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A single (country, city) pair to resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Normalized country name
    pub country: String,
    /// Normalized city name
    pub city: String,
    /// Cache key for the pair
    pub key: PlaceKey,
    /// Position in the work list, used to keep output order stable
    pub ordinal: usize,
}

impl WorkItem {
    /// Create a work item from normalized names
    pub fn new(country: impl Into<String>, city: impl Into<String>, ordinal: usize) -> Self {
        let country = country.into();
        let city = city.into();
        let key = PlaceKey::new(&country, &city);
        Self {
            country,
            city,
            key,
            ordinal,
        }
    }

    /// Compound query sent first: `"City, Country"`
    pub fn primary_query(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }

    /// Looser query used when the compound one fails
    pub fn fallback_query(&self) -> &str {
        &self.city
    }
}

/// Latitude/longitude pair as persisted in the cache
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}

/// Which geocoding backend is in use for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Credentialed, higher-throughput service
    Keyed,
    /// Public service limited to roughly one request per second
    Unkeyed,
}

impl ProviderKind {
    /// Human-readable backend name
    pub fn service_name(&self) -> &'static str {
        match self {
            Self::Keyed => "OpenCage",
            Self::Unkeyed => "Nominatim",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyed => write!(f, "keyed ({})", self.service_name()),
            Self::Unkeyed => write!(f, "unkeyed ({})", self.service_name()),
        }
    }
}

/// A coordinate returned by a provider, tagged with its provenance
///
/// Provenance is diagnostic only; the cache stores the bare [`Coordinate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodeResult {
    pub coordinate: Coordinate,
    pub provider: ProviderKind,
}

impl GeocodeResult {
    pub fn new(lat: f64, lng: f64, provider: ProviderKind) -> Self {
        Self {
            coordinate: Coordinate::new(lat, lng),
            provider,
        }
    }
}

/// One entry in the output catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCity {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl ResolvedCity {
    pub fn new(name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            name: name.into(),
            lat: coordinate.lat,
            lng: coordinate.lng,
        }
    }
}
