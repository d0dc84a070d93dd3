//! Command handlers for City Geocoder CLI
//!
//! This module implements the command handlers that connect CLI arguments and
//! the loaded configuration to the core application functionality.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::app::cache::CacheStore;
use crate::app::catalog::{load_catalog, WorkList};
use crate::app::client::select_provider;
use crate::app::coordinator::{Coordinator, ProgressReporter, RunPlan, SessionResult};
use crate::app::models::{PlaceKey, ProviderKind};
use crate::app::resolver::Resolver;
use crate::auth::{get_auth_status, show_auth_status, Credential};
use crate::cli::{
    AuthAction, AuthArgs, CacheAction, CacheArgs, ConfigAction, ConfigArgs, GeocodeArgs,
    ProgressDisplay,
};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Handle the geocode command
///
/// Resolves the input catalog, persists the cache and writes the output
/// catalog. Unresolved places are reported in the summary but never fail
/// the command.
pub async fn handle_geocode(args: GeocodeArgs, config: &AppConfig, quiet: bool) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    let input = args.input.clone().unwrap_or_else(|| config.paths.input.clone());
    let cache_path = args.cache.clone().unwrap_or_else(|| config.paths.cache.clone());
    let output = args.output.clone().unwrap_or_else(|| config.paths.output.clone());

    let mut coordinator_config = config.coordinator.clone();
    if let Some(workers) = args.workers {
        coordinator_config = coordinator_config.with_keyed_concurrency(workers);
    }
    coordinator_config.validate().map_err(AppError::generic)?;

    let credential = Credential::from_environment(
        args.api_key.as_deref(),
        config.providers.api_key.as_deref(),
    );
    debug!("Credential source: {}", credential.source());

    if args.dry_run {
        let plan = plan_run(&input, &cache_path).await;
        print_plan(&plan, credential.provider(), config);
        return Ok(());
    }

    let provider = select_provider(&config.client, &config.providers, credential.key())?;
    let resolver = Resolver::new(provider, config.retry.clone());

    let (reporter, events) = ProgressReporter::channel(coordinator_config.progress_buffer_size);
    let display = ProgressDisplay::new(!quiet && !args.no_progress).spawn(events);

    let coordinator = Coordinator::new(coordinator_config, resolver).with_reporter(reporter);
    let result = coordinator.run_pipeline(&input, &cache_path, &output).await;

    // Closing the reporter ends the display task
    drop(coordinator);
    if let Err(e) = display.await {
        debug!("Progress display task failed: {}", e);
    }

    let result = result?;
    print_summary(&result, &cache_path, &output, quiet);
    Ok(())
}

async fn plan_run(input: &Path, cache_path: &Path) -> RunPlan {
    let catalog = load_catalog(input).await;
    let work_list = WorkList::build(&catalog);
    let cache = CacheStore::load(cache_path).await;
    Coordinator::plan(&work_list, &cache)
}

fn print_plan(plan: &RunPlan, provider: ProviderKind, config: &AppConfig) {
    println!("🔍 Dry run: no provider calls, no files written");
    println!("  Unique places: {}", plan.total);
    println!("  Countries: {}", plan.countries);
    println!("  Cache hits: {}", plan.cache_hits);
    println!("  Pending lookups: {}", plan.pending);
    if plan.duplicates > 0 || plan.skipped_empty > 0 {
        println!(
            "  Dropped: {} duplicates, {} empty names",
            plan.duplicates, plan.skipped_empty
        );
    }
    println!("  Provider: {}", provider);

    if provider == ProviderKind::Unkeyed && plan.pending > 0 {
        let seconds = config.client.unkeyed_min_interval.as_secs_f64() * plan.pending as f64;
        println!(
            "  Minimum lookup time: ~{:.0}s ({} calls at one per {:?})",
            seconds, plan.pending, config.client.unkeyed_min_interval
        );
    }
}

fn print_summary(result: &SessionResult, cache_path: &Path, output: &Path, quiet: bool) {
    let stats = &result.stats;

    if !quiet {
        println!();
        println!("📊 Geocoding Summary:");
        println!("  Provider: {} ({} workers)", result.provider, result.workers);
        println!("  Cache hits: {}", stats.cache_hits);
        println!(
            "  Resolved: {} ({} via city-only fallback)",
            stats.resolved, stats.resolved_via_fallback
        );
        println!("  Misses: {}", stats.misses);
        println!(
            "  Cache: {} new entries in {}",
            result.new_cache_entries,
            cache_path.display()
        );
        println!("  Output: {}", output.display());
        println!(
            "  Duration: {:.1?} ({:.2} lookups/s)",
            result.total_duration,
            result.lookup_rate()
        );
        println!();
    }

    if !result.errors.is_empty() {
        warn!("Session completed with persistence errors");
        for error in &result.errors {
            eprintln!("Warning: {}", error);
        }
    }

    println!("{}", stats.summary_line());
}

/// Handle cache inspection commands
pub async fn handle_cache(args: CacheArgs, config: &AppConfig) -> Result<()> {
    let cache_path = args.cache.unwrap_or_else(|| config.paths.cache.clone());

    match args.action {
        CacheAction::Info => handle_cache_info(&cache_path).await,
        CacheAction::Lookup { country, city } => {
            handle_cache_lookup(&cache_path, &country, &city).await
        }
    }
}

async fn handle_cache_info(cache_path: &Path) -> Result<()> {
    let store = CacheStore::load(cache_path).await;
    let summary = store.summary();

    println!("💾 Cache Information");
    println!("===================");
    println!("Location: {}", cache_path.display());
    println!(
        "File: {}",
        if cache_path.exists() { "Exists" } else { "Not found" }
    );
    println!("Cached places: {}", summary.entries);
    println!("Countries: {}", summary.countries);

    Ok(())
}

async fn handle_cache_lookup(cache_path: &Path, country: &str, city: &str) -> Result<()> {
    let store = CacheStore::load(cache_path).await;
    let key = PlaceKey::from_raw(country, city);

    match store.get(&key) {
        Some(coordinate) => println!("{}: {}", key, coordinate),
        None => println!("{}: not cached", key),
    }
    Ok(())
}

/// Handle configuration commands
pub async fn handle_config(
    args: ConfigArgs,
    config: &AppConfig,
    source: Option<&PathBuf>,
) -> Result<()> {
    match args.action {
        ConfigAction::Init => {
            let (path, created) = AppConfig::initialize().await?;
            if created {
                println!("📁 Created default configuration file:");
                println!("   {}", path.display());
                println!("   You can customize settings by editing this file.");
            } else {
                println!("Configuration file already exists: {}", path.display());
            }
            Ok(())
        }
        ConfigAction::Show => {
            match source {
                Some(path) => println!("# Loaded from {}", path.display()),
                None => println!("# No config file found, showing defaults"),
            }
            print!("{}", config.to_redacted_toml()?);
            Ok(())
        }
    }
}

/// Handle credential status commands
pub async fn handle_auth(args: AuthArgs, config: &AppConfig) -> Result<()> {
    match args.action {
        AuthAction::Status { api_key } => {
            info!("Checking credential status");
            let status = get_auth_status(api_key.as_deref(), config.providers.api_key.as_deref());
            show_auth_status(&status);
            Ok(())
        }
    }
}
