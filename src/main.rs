//! GolfFox Worker - route optimization backend
//!
//! This worker connects to NATS and answers route optimization, suggestion
//! and address validation requests from the dispatch frontend.

mod cli;
mod config;
mod error;
mod handlers;
mod services;
mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::directions::create_directions_provider;
use crate::services::optimizer::{generate_optimization_suggestion, RouteOptimizer};
use crate::services::route_cache::RouteCache;
use crate::types::RouteOptimizationOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Logs directory - use LOGS_DIR env var or default to ../logs (relative to worker)
    let logs_dir = std::env::var("LOGS_DIR")
        .unwrap_or_else(|_| "../logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        &logs_dir,
        "worker.log",
    );
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stdout and file
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,golffox_worker=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())  // stdout
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))  // file
        .init();

    match cli.command {
        None | Some(cli::Command::Serve) => run_server().await,
        Some(cli::Command::Optimize { request }) => run_optimize(&request).await,
        Some(cli::Command::Suggest { passengers }) => {
            println!("{}", generate_optimization_suggestion(passengers));
            Ok(())
        }
    }
}

/// Build the optimizer described by the configuration
async fn build_optimizer(config: &Config) -> Result<RouteOptimizer> {
    let provider = create_directions_provider(&config.directions).await?;
    match provider {
        Some(ref p) => info!("Directions provider initialized: {}", p.name()),
        None => info!("No directions provider configured; route requests will be rejected"),
    }

    let cache = Arc::new(RouteCache::new(config.cache));
    Ok(RouteOptimizer::new(provider.map(Arc::from), cache).with_timeout(config.directions.timeout))
}

async fn run_server() -> Result<()> {
    info!("Starting GolfFox Worker...");

    let config = Config::from_env()?;
    info!("Configuration loaded");

    let optimizer = Arc::new(build_optimizer(&config).await?);
    optimizer.start();
    let cache_config = optimizer.cache().config();
    info!(
        "Route cache started (ttl {}s, sweep every {}s)",
        cache_config.ttl.as_secs(),
        cache_config.sweep_interval.as_secs()
    );

    let nats_client = match config.nats_credentials {
        Some((ref user, ref password)) => {
            async_nats::ConnectOptions::new()
                .user_and_password(user.clone(), password.clone())
                .connect(&config.nats_url)
                .await?
        }
        None => async_nats::connect(&config.nats_url).await?,
    };
    info!("Connected to NATS at {}", config.nats_url);

    let handler_result = handlers::start_handlers(nats_client, Arc::clone(&optimizer)).await;

    optimizer.stop().await;

    if let Err(e) = handler_result {
        error!("Handler error: {}", e);
        return Err(e);
    }

    Ok(())
}

/// Optimize a single request read from disk and print the route as JSON
async fn run_optimize(path: &Path) -> Result<()> {
    let config = Config::from_env()?;

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let options: RouteOptimizationOptions = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let optimizer = build_optimizer(&config).await?;
    let route = optimizer
        .optimize_route(&options)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", e.code(), e))?;

    println!("{}", serde_json::to_string_pretty(&route)?);
    Ok(())
}
