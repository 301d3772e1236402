//! Configuration management

use std::time::Duration;

use anyhow::{self, Context, Result};

use crate::services::directions::{DirectionsBackend, DirectionsConfig};
use crate::services::route_cache::{
    RouteCacheConfig, DEFAULT_SWEEP_INTERVAL_SECS, DEFAULT_TTL_SECS, MAX_SWEEP_INTERVAL_SECS,
};
use crate::services::optimizer::DEFAULT_PROVIDER_TIMEOUT_SECS;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// NATS server URL
    pub nats_url: String,

    /// Optional NATS credentials
    pub nats_credentials: Option<(String, String)>,

    /// Directions provider selection
    pub directions: DirectionsConfig,

    /// Route cache timing
    pub cache: RouteCacheConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let nats_url = lookup("NATS_URL")
            .unwrap_or_else(|| "nats://localhost:4222".to_string());

        let nats_credentials = match (lookup("NATS_USER"), lookup("NATS_PASSWORD")) {
            (Some(user), Some(password)) if !user.is_empty() => Some((user, password)),
            _ => None,
        };

        let backend = match lookup("DIRECTIONS_BACKEND") {
            Some(value) => DirectionsBackend::parse(&value).with_context(|| {
                format!("DIRECTIONS_BACKEND must be one of google, valhalla, estimate, none (got '{}')", value)
            })?,
            None => DirectionsBackend::Estimate,
        };

        let google_api_key = lookup("GOOGLE_MAPS_API_KEY").filter(|k| !k.trim().is_empty());

        let mut directions = DirectionsConfig {
            backend,
            google_api_key,
            valhalla_url: lookup("VALHALLA_URL"),
            timeout: Duration::from_secs(parse_secs(
                &lookup,
                "DIRECTIONS_TIMEOUT_SECS",
                DEFAULT_PROVIDER_TIMEOUT_SECS,
            )?),
            ..DirectionsConfig::default()
        };
        if let Some(url) = lookup("GOOGLE_DIRECTIONS_URL") {
            directions.google_base_url = url;
        }

        let cache = RouteCacheConfig {
            ttl: Duration::from_secs(parse_secs(&lookup, "ROUTE_CACHE_TTL_SECS", DEFAULT_TTL_SECS)?),
            sweep_interval: Duration::from_secs(parse_secs(
                &lookup,
                "ROUTE_CACHE_SWEEP_SECS",
                DEFAULT_SWEEP_INTERVAL_SECS,
            )?),
        };

        if cache.sweep_interval.is_zero() {
            anyhow::bail!("ROUTE_CACHE_SWEEP_SECS must be greater than zero");
        }
        if cache.sweep_interval > Duration::from_secs(MAX_SWEEP_INTERVAL_SECS) {
            anyhow::bail!(
                "ROUTE_CACHE_SWEEP_SECS must be at most {} (got {})",
                MAX_SWEEP_INTERVAL_SECS,
                cache.sweep_interval.as_secs()
            );
        }

        Ok(Self {
            nats_url,
            nats_credentials,
            directions,
            cache,
        })
    }
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} must be a whole number of seconds (got '{}')", key, value)),
        None => Ok(default),
    }
}
