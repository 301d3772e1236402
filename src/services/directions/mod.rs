//! Directions providers
//!
//! Google Directions or Valhalla in production, an offline estimating
//! provider for development and tests.

mod google;
mod polyline;
mod valhalla;

pub use google::{GoogleDirectionsClient, GoogleDirectionsConfig};
pub use polyline::decode_polyline;
pub use valhalla::{ValhallaClient, ValhallaConfig};

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::services::geo::{self, AVERAGE_SPEED_KMH, ROAD_COEFFICIENT};
use crate::types::Coordinates;

/// Route query sent to a provider
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRequest {
    pub origin: Coordinates,
    pub destination: Coordinates,
    /// Intermediate stops, in caller order
    pub waypoints: Vec<Coordinates>,
    /// Let the provider reorder the waypoints
    pub optimize_waypoints: bool,
}

/// One leg between consecutive stops
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteLeg {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// Provider answer
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsResponse {
    /// Visit order as indices into the request's waypoints
    pub waypoint_order: Vec<usize>,
    /// `waypoints.len() + 1` legs, in visit order
    pub legs: Vec<RouteLeg>,
    pub polyline: Vec<Coordinates>,
}

/// Provider-level failure
#[derive(Debug, Error)]
pub enum DirectionsError {
    #[error("provider client is not initialized")]
    NotReady,

    #[error("request to provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider returned status {status}: {message}")]
    Api { status: String, message: String },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Directions provider abstraction (Google, Valhalla, estimate)
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    /// Compute a route through the request's points
    async fn directions(&self, request: &DirectionsRequest) -> Result<DirectionsResponse, DirectionsError>;

    /// Whether the client finished initializing and can take requests
    fn is_ready(&self) -> bool {
        true
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Offline provider: Haversine distance × road coefficient at an average speed.
/// Optimizes with nearest neighbor; the polyline is the straight line through all stops.
pub struct EstimatingProvider {
    road_coefficient: f64,
    average_speed_kmh: f64,
}

impl Default for EstimatingProvider {
    fn default() -> Self {
        Self {
            road_coefficient: ROAD_COEFFICIENT,
            average_speed_kmh: AVERAGE_SPEED_KMH,
        }
    }
}

impl EstimatingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(road_coefficient: f64, average_speed_kmh: f64) -> Self {
        Self {
            road_coefficient,
            average_speed_kmh,
        }
    }
}

#[async_trait]
impl DirectionsProvider for EstimatingProvider {
    async fn directions(&self, request: &DirectionsRequest) -> Result<DirectionsResponse, DirectionsError> {
        let waypoint_order: Vec<usize> = if request.optimize_waypoints {
            geo::nearest_neighbor_order(&request.origin, &request.waypoints)
        } else {
            (0..request.waypoints.len()).collect()
        };

        let mut path = Vec::with_capacity(request.waypoints.len() + 2);
        path.push(request.origin);
        path.extend(waypoint_order.iter().map(|&i| request.waypoints[i]));
        path.push(request.destination);

        let legs = path
            .windows(2)
            .map(|pair| {
                let km = geo::road_distance(&pair[0], &pair[1], self.road_coefficient);
                RouteLeg {
                    distance_meters: km * 1000.0,
                    duration_seconds: geo::travel_time_minutes(km, self.average_speed_kmh) * 60.0,
                }
            })
            .collect();

        Ok(DirectionsResponse {
            waypoint_order,
            legs,
            polyline: path,
        })
    }

    fn name(&self) -> &str {
        "Estimate"
    }
}

/// Which provider backend to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionsBackend {
    Google,
    Valhalla,
    Estimate,
    /// No provider in this environment
    None,
}

impl DirectionsBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "google" => Some(DirectionsBackend::Google),
            "valhalla" => Some(DirectionsBackend::Valhalla),
            "estimate" | "mock" => Some(DirectionsBackend::Estimate),
            "none" => Some(DirectionsBackend::None),
            _ => None,
        }
    }
}

/// Provider selection and connection settings
#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    pub backend: DirectionsBackend,
    pub google_api_key: Option<String>,
    pub google_base_url: String,
    pub valhalla_url: Option<String>,
    /// Applies to HTTP clients and to the optimizer's provider call
    pub timeout: Duration,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            backend: DirectionsBackend::Estimate,
            google_api_key: None,
            google_base_url: google::DEFAULT_BASE_URL.to_string(),
            valhalla_url: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Create the configured provider.
///
/// Valhalla is health-checked and falls back to the estimating provider when
/// unreachable. `None` backend yields no provider at all.
pub async fn create_directions_provider(
    config: &DirectionsConfig,
) -> anyhow::Result<Option<Box<dyn DirectionsProvider>>> {
    match config.backend {
        DirectionsBackend::None => {
            info!("No directions provider configured");
            Ok(None)
        }
        DirectionsBackend::Estimate => {
            info!("Using estimating directions provider");
            Ok(Some(Box::new(EstimatingProvider::new())))
        }
        DirectionsBackend::Google => {
            if config.google_api_key.is_none() {
                warn!("GOOGLE_MAPS_API_KEY is not set; Google directions client will report not ready");
            }
            let client = GoogleDirectionsClient::new(GoogleDirectionsConfig {
                base_url: config.google_base_url.clone(),
                api_key: config.google_api_key.clone(),
                timeout: config.timeout,
            })?;
            Ok(Some(Box::new(client)))
        }
        DirectionsBackend::Valhalla => {
            let Some(url) = config.valhalla_url.as_deref() else {
                warn!("VALHALLA_URL is not set. Falling back to estimating provider.");
                return Ok(Some(Box::new(EstimatingProvider::new())));
            };

            match valhalla::check_health(url).await {
                Ok(()) => {
                    info!("Valhalla routing service available at {}", url);
                    let client = ValhallaClient::new(ValhallaConfig {
                        base_url: url.to_string(),
                        timeout: config.timeout,
                    })?;
                    Ok(Some(Box::new(client)))
                }
                Err(e) => {
                    warn!("Valhalla not available at {}: {}. Falling back to estimating provider.", url, e);
                    Ok(Some(Box::new(EstimatingProvider::new())))
                }
            }
        }
    }
}
