//! Input catalog loading and work list construction
//!
//! The catalog is produced by an external acquisition step. A missing file is
//! treated as an empty catalog so the pipeline can run standalone, and a
//! malformed one is logged and replaced by an empty catalog.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::app::models::{normalize_place_name, PlaceCatalog, PlaceKey, WorkItem};
use crate::errors::{CatalogError, CatalogResult};

/// Load the input catalog, substituting an empty one when absent or malformed
pub async fn load_catalog(path: &Path) -> PlaceCatalog {
    match read_catalog(path).await {
        Ok(Some(catalog)) => {
            info!(
                "Loaded catalog with {} countries from {}",
                catalog.len(),
                path.display()
            );
            catalog
        }
        Ok(None) => {
            info!(
                "No catalog found at {}, continuing with an empty catalog",
                path.display()
            );
            PlaceCatalog::new()
        }
        Err(e) => {
            warn!("{}. Continuing with an empty catalog", e);
            PlaceCatalog::new()
        }
    }
}

/// Read and parse the catalog file
///
/// Returns `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// Returns `CatalogError` if the file cannot be read or is not a mapping of
/// country names to arrays of city names
pub async fn read_catalog(path: &Path) -> CatalogResult<Option<PlaceCatalog>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(CatalogError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let catalog: PlaceCatalog =
        serde_json::from_str(&content).map_err(|e| CatalogError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    Ok(Some(catalog))
}

/// Deduplicated resolution tasks plus the countries the output must contain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkList {
    /// One item per unique normalized (country, city) pair
    pub items: Vec<WorkItem>,
    /// Every normalized country, including those with no usable cities
    pub countries: Vec<String>,
    /// Cities dropped because their key was already in the list
    pub duplicates: usize,
    /// Cities dropped because they were empty after normalization
    pub skipped_empty: usize,
}

impl WorkList {
    /// Flatten a catalog into work items
    ///
    /// Countries that normalize to the same name are merged. Countries whose
    /// name is empty after normalization are dropped entirely.
    pub fn build(catalog: &PlaceCatalog) -> Self {
        let mut list = WorkList::default();
        let mut seen_keys: HashSet<PlaceKey> = HashSet::new();
        let mut seen_countries: HashSet<String> = HashSet::new();

        for (raw_country, cities) in catalog {
            let country = normalize_place_name(raw_country);
            if country.is_empty() {
                warn!(
                    "Skipping country with empty name after normalization: {:?} ({} cities)",
                    raw_country,
                    cities.len()
                );
                list.skipped_empty += cities.len();
                continue;
            }

            if seen_countries.insert(country.clone()) {
                list.countries.push(country.clone());
            }

            for raw_city in cities {
                let city = normalize_place_name(raw_city);
                if city.is_empty() {
                    list.skipped_empty += 1;
                    continue;
                }

                let key = PlaceKey::new(&country, &city);
                if !seen_keys.insert(key) {
                    debug!("Duplicate place skipped: {} / {}", country, city);
                    list.duplicates += 1;
                    continue;
                }

                let ordinal = list.items.len();
                list.items.push(WorkItem::new(country.clone(), city, ordinal));
            }
        }

        debug!(
            "Built work list: {} items across {} countries ({} duplicates, {} empty)",
            list.items.len(),
            list.countries.len(),
            list.duplicates,
            list.skipped_empty
        );

        list
    }

    /// Number of work items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there is nothing to resolve
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
