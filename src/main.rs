//! City Geocoder CLI application
//!
//! Command-line interface for resolving a country/city catalog to coordinates
//! with a resumable on-disk cache.

use std::process;
use std::str::FromStr;

use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use city_geocoder::cli::{handle_auth, handle_cache, handle_config, handle_geocode, Cli, Commands};
use city_geocoder::config::AppConfig;
use city_geocoder::constants::logging;
use city_geocoder::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();
    let (config, config_source) = AppConfig::load_with_source(cli.global.config.clone()).await?;

    init_logging(&cli, &config);

    info!("City Geocoder v{} starting", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &config_source {
        info!("Using configuration from {}", path.display());
    }

    let quiet = cli.global.quiet;
    match cli.command {
        Commands::Geocode(args) => {
            info!("Executing geocode command");
            handle_geocode(args, &config, quiet).await
        }
        Commands::Cache(args) => {
            info!("Executing cache command");
            handle_cache(args, &config).await
        }
        Commands::Config(args) => {
            info!("Executing config command");
            handle_config(args, &config, config_source.as_ref()).await
        }
        Commands::Auth(args) => {
            info!("Executing auth command");
            handle_auth(args, &config).await
        }
    }
}

/// Initialize logging based on CLI verbosity and the configured level
fn init_logging(cli: &Cli, config: &AppConfig) {
    let default_level =
        tracing::Level::from_str(&config.logging.level).unwrap_or(tracing::Level::INFO);
    let log_level = cli.log_level(default_level);

    let mut filter = EnvFilter::from_default_env();
    match format!("{}={}", logging::CRATE_TARGET, log_level).parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("Ignoring invalid log directive: {}", e),
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    } else if cli.quiet_overrides(default_level) {
        warn!("Quiet mode overrides configured log level");
    }
}
