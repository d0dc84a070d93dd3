//! Integration tests for the geocoding pipeline
//!
//! These tests drive `Coordinator::run_pipeline` against real files in a
//! temporary directory, with a scripted provider standing in for the network.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use city_geocoder::app::{
    Coordinator, CoordinatorConfig, GeocodeProvider, GeocodeResult, ProviderKind, Resolver,
    RetryPolicy,
};
use city_geocoder::errors::{ProviderError, ProviderResult};

/// Scripted answer for a single query string
#[derive(Clone, Copy)]
enum Reply {
    Found(f64, f64),
    Empty,
    Fail,
}

/// Provider that answers from a fixed table and records every call
#[derive(Default)]
struct ScriptedProvider {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl ScriptedProvider {
    fn new(replies: &[(&str, Reply)]) -> Arc<Self> {
        Arc::new(Self {
            replies: replies
                .iter()
                .map(|(query, reply)| (query.to_string(), *reply))
                .collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn queries(&self) -> Vec<String> {
        let mut queries: Vec<String> = self
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(query, _)| query.clone())
            .collect();
        queries.sort();
        queries
    }

    fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GeocodeProvider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Keyed
    }

    async fn resolve(
        &self,
        query: &str,
        country_hint: Option<&str>,
    ) -> ProviderResult<Option<GeocodeResult>> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), country_hint.map(str::to_string)));

        match self.replies.get(query).copied().unwrap_or(Reply::Empty) {
            Reply::Found(lat, lng) => Ok(Some(GeocodeResult::new(lat, lng, ProviderKind::Keyed))),
            Reply::Empty => Ok(None),
            Reply::Fail => Err(ProviderError::Status { status: 503 }),
        }
    }
}

/// Temporary input/cache/output file set
struct Workspace {
    _dir: TempDir,
    input: PathBuf,
    cache: PathBuf,
    output: PathBuf,
}

impl Workspace {
    async fn with_input(input: Value) -> Self {
        let dir = TempDir::new().unwrap();
        let input_path = dir.path().join("cities.json");
        tokio::fs::write(&input_path, serde_json::to_vec_pretty(&input).unwrap())
            .await
            .unwrap();

        Self {
            input: input_path,
            cache: dir.path().join("geocode-cache.json"),
            output: dir.path().join("cities-geocoded.json"),
            _dir: dir,
        }
    }

    async fn run(&self, provider: Arc<ScriptedProvider>) -> city_geocoder::app::SessionResult {
        let coordinator = Coordinator::new(
            CoordinatorConfig::default().with_checkpoint_every(2),
            Resolver::new(provider, RetryPolicy::no_retry()),
        );
        coordinator
            .run_pipeline(&self.input, &self.cache, &self.output)
            .await
            .unwrap()
    }
}

async fn read_json(path: &Path) -> Value {
    let content = tokio::fs::read_to_string(path).await.unwrap();
    serde_json::from_str(&content).unwrap()
}

#[tokio::test]
async fn test_end_to_end_resolves_and_caches() {
    let workspace =
        Workspace::with_input(json!({"Germany": ["Berlin", "Frankfurt (virtual)"]})).await;
    let provider = ScriptedProvider::new(&[
        ("Berlin, Germany", Reply::Found(52.52, 13.405)),
        ("Frankfurt, Germany", Reply::Found(50.1109, 8.6821)),
    ]);

    let result = workspace.run(provider.clone()).await;

    assert_eq!(result.stats.total, 2);
    assert_eq!(result.stats.resolved, 2);
    assert_eq!(result.stats.cache_hits, 0);
    assert_eq!(result.stats.misses, 0);
    assert!(result.is_success());

    let output = read_json(&workspace.output).await;
    assert_eq!(
        output,
        json!({
            "Germany": [
                {"name": "Berlin", "lat": 52.52, "lng": 13.405},
                {"name": "Frankfurt", "lat": 50.1109, "lng": 8.6821}
            ]
        })
    );

    let cache = read_json(&workspace.cache).await;
    let keys: Vec<&String> = cache.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["Germany::Berlin", "Germany::Frankfurt"]);
    assert_eq!(cache["Germany::Berlin"], json!({"lat": 52.52, "lng": 13.405}));

    // Primary queries carry the country hint
    assert!(provider
        .calls()
        .iter()
        .all(|(_, hint)| hint.as_deref() == Some("de")));
}

#[tokio::test]
async fn test_unresolvable_city_is_omitted_but_country_kept() {
    let workspace = Workspace::with_input(json!({"Nowhere": ["Atlantis"]})).await;
    let provider = ScriptedProvider::new(&[]);

    let result = workspace.run(provider.clone()).await;

    assert_eq!(result.stats.misses, 1);
    assert_eq!(result.stats.resolved, 0);
    assert_eq!(read_json(&workspace.output).await, json!({"Nowhere": []}));

    // Primary then fallback, and nothing cached for a miss
    assert_eq!(
        provider.calls(),
        vec![
            ("Atlantis, Nowhere".to_string(), None),
            ("Atlantis".to_string(), None),
        ]
    );
    assert!(!workspace.cache.exists());
}

#[tokio::test]
async fn test_fallback_used_after_primary_failure() {
    let workspace = Workspace::with_input(json!({"France": ["Paris"]})).await;
    let provider = ScriptedProvider::new(&[
        ("Paris, France", Reply::Fail),
        ("Paris", Reply::Found(48.8566, 2.3522)),
    ]);

    let result = workspace.run(provider.clone()).await;

    assert_eq!(result.stats.resolved, 1);
    assert_eq!(result.stats.resolved_via_fallback, 1);
    assert_eq!(
        provider.calls(),
        vec![
            ("Paris, France".to_string(), Some("fr".to_string())),
            ("Paris".to_string(), None),
        ]
    );

    let cache = read_json(&workspace.cache).await;
    assert_eq!(cache["France::Paris"], json!({"lat": 48.8566, "lng": 2.3522}));
}

#[tokio::test]
async fn test_resume_only_queries_missing_places() {
    let workspace = Workspace::with_input(json!({
        "Germany": ["Berlin", "Hamburg", "Munich"],
        "Italy": ["Rome"]
    }))
    .await;
    tokio::fs::write(
        &workspace.cache,
        serde_json::to_vec(&json!({
            "Germany::Berlin": {"lat": 52.52, "lng": 13.405},
            "Italy::Rome": {"lat": 41.9028, "lng": 12.4964}
        }))
        .unwrap(),
    )
    .await
    .unwrap();

    let provider = ScriptedProvider::new(&[
        ("Hamburg, Germany", Reply::Found(53.5511, 9.9937)),
        ("Munich, Germany", Reply::Found(48.1351, 11.582)),
    ]);

    let result = workspace.run(provider.clone()).await;

    assert_eq!(result.stats.cache_hits, 2);
    assert_eq!(result.stats.resolved, 2);
    assert_eq!(result.new_cache_entries, 2);
    assert_eq!(
        provider.queries(),
        vec!["Hamburg, Germany".to_string(), "Munich, Germany".to_string()]
    );

    let cache = read_json(&workspace.cache).await;
    assert_eq!(cache.as_object().unwrap().len(), 4);

    let output = read_json(&workspace.output).await;
    let germany: Vec<&str> = output["Germany"]
        .as_array()
        .unwrap()
        .iter()
        .map(|city| city["name"].as_str().unwrap())
        .collect();
    assert_eq!(germany, vec!["Berlin", "Hamburg", "Munich"]);
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let workspace = Workspace::with_input(json!({
        "Germany": ["Berlin", "Frankfurt (virtual)"],
        "Spain": ["Madrid", "Valencia"]
    }))
    .await;
    let replies = [
        ("Berlin, Germany", Reply::Found(52.52, 13.405)),
        ("Frankfurt, Germany", Reply::Found(50.1109, 8.6821)),
        ("Madrid, Spain", Reply::Found(40.4168, -3.7038)),
        ("Valencia, Spain", Reply::Found(39.4699, -0.3763)),
    ];

    workspace.run(ScriptedProvider::new(&replies)).await;
    let first_output = tokio::fs::read(&workspace.output).await.unwrap();
    let first_cache = tokio::fs::read(&workspace.cache).await.unwrap();

    let provider = ScriptedProvider::new(&replies);
    let result = workspace.run(provider.clone()).await;

    assert!(provider.calls().is_empty());
    assert_eq!(result.stats.cache_hits, 4);
    assert_eq!(result.new_cache_entries, 0);
    assert_eq!(result.checkpoints, 0);
    assert_eq!(tokio::fs::read(&workspace.output).await.unwrap(), first_output);
    assert_eq!(tokio::fs::read(&workspace.cache).await.unwrap(), first_cache);
}

#[tokio::test]
async fn test_normalized_duplicates_resolved_once() {
    let workspace = Workspace::with_input(json!({
        "Germany": ["Berlin", " Berlin (virtual) ", "Berlin"]
    }))
    .await;
    let provider = ScriptedProvider::new(&[("Berlin, Germany", Reply::Found(52.52, 13.405))]);

    let result = workspace.run(provider.clone()).await;

    assert_eq!(result.stats.total, 1);
    assert_eq!(provider.calls().len(), 1);
    assert_eq!(
        read_json(&workspace.output).await,
        json!({"Germany": [{"name": "Berlin", "lat": 52.52, "lng": 13.405}]})
    );
}

#[tokio::test]
async fn test_malformed_cache_is_treated_as_empty() {
    let workspace = Workspace::with_input(json!({"Germany": ["Berlin"]})).await;
    tokio::fs::write(&workspace.cache, b"{ not json").await.unwrap();
    let provider = ScriptedProvider::new(&[("Berlin, Germany", Reply::Found(52.52, 13.405))]);

    let result = workspace.run(provider.clone()).await;

    assert_eq!(result.stats.cache_hits, 0);
    assert_eq!(result.stats.resolved, 1);

    // The corrupt file is replaced by a valid one
    let cache = read_json(&workspace.cache).await;
    assert_eq!(cache["Germany::Berlin"], json!({"lat": 52.52, "lng": 13.405}));
}

#[tokio::test]
async fn test_missing_or_malformed_input_yields_empty_output() {
    let workspace = Workspace::with_input(json!({})).await;
    tokio::fs::write(&workspace.input, b"[1, 2, 3]").await.unwrap();
    let provider = ScriptedProvider::new(&[]);

    let result = workspace.run(provider.clone()).await;

    assert_eq!(result.stats.total, 0);
    assert!(provider.calls().is_empty());
    assert_eq!(read_json(&workspace.output).await, json!({}));

    tokio::fs::remove_file(&workspace.input).await.unwrap();
    let result = workspace.run(ScriptedProvider::new(&[])).await;
    assert_eq!(result.stats.total, 0);
}
