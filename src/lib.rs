pub mod acquire;
pub mod api;
pub mod cli;
pub mod core;
pub mod extract;
pub mod providers;
pub mod resolver;
pub mod store;

use crate::acquire::RateAcquirer;
use crate::api::AppState;
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::AppConfig;
use crate::core::rate::{AcquisitionResult, RateSource};
use crate::providers::HttpPageFetcher;
use crate::resolver::MonthResolver;
use crate::store::RateCache;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Serve { port: Option<u16> },
    Fetch,
}

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

/// Builds the production acquisition pipeline from configuration.
pub fn build_source(config: &AppConfig) -> Result<RateAcquirer<HttpPageFetcher>> {
    let fetcher = HttpPageFetcher::new(config.source.fetch_timeout(), config.source.precheck)?;
    let resolver = MonthResolver::from_config(fetcher, &config.source);
    Ok(RateAcquirer::new(resolver))
}

pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let source = build_source(config)?;
    let cache = RateCache::new(Box::new(source), config.cache.fallback_retry_interval());
    let clock = SystemClock::new(config.utc_offset()?);
    Ok(AppState::new(cache, Box::new(clock)))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;

    match command {
        AppCommand::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let addr: SocketAddr = format!("{}:{}", config.server.host, port)
                .parse()
                .with_context(|| format!("Invalid listen address: {}:{}", config.server.host, port))?;
            info!("MERALCO API starting...");
            let state = Arc::new(build_state(&config)?);
            api::start(addr, state).await
        }
        AppCommand::Fetch => {
            let result = fetch_once(&config).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}

/// Runs a single uncached acquisition.
pub async fn fetch_once(config: &AppConfig) -> Result<AcquisitionResult> {
    info!("Fetching MERALCO electricity rates...");
    let source = build_source(config)?;
    let now = SystemClock::new(config.utc_offset()?).now();
    Ok(source.acquire(now).await)
}
