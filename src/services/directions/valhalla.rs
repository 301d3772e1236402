//! Valhalla routing engine client
//!
//! Valhalla API documentation:
//! https://valhalla.github.io/valhalla/api/turn-by-turn/api-reference/
//! https://valhalla.github.io/valhalla/api/optimized/api-reference/

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{decode_polyline, DirectionsError, DirectionsProvider, DirectionsRequest, DirectionsResponse, RouteLeg};
use crate::types::Coordinates;

/// Valhalla encodes shapes with 6 decimal places
const SHAPE_PRECISION: u32 = 6;

/// Valhalla client configuration
#[derive(Debug, Clone)]
pub struct ValhallaConfig {
    /// Base URL of Valhalla server (e.g., "http://localhost:8002")
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ValhallaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8002".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Valhalla routing client
pub struct ValhallaClient {
    client: Client,
    config: ValhallaConfig,
}

impl ValhallaClient {
    pub fn new(config: ValhallaConfig) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Build the route request: origin, waypoints in caller order, destination
    fn build_route_request(&self, request: &DirectionsRequest) -> RouteRequest {
        let locations = std::iter::once(&request.origin)
            .chain(request.waypoints.iter())
            .chain(std::iter::once(&request.destination))
            .map(|c| ValhallaLocation {
                lat: c.lat,
                lon: c.lng,
                // 200m radius tolerates pickup points set slightly off-road
                radius: Some(200),
            })
            .collect();

        RouteRequest {
            locations,
            costing: "auto".to_string(),
            units: "kilometers".to_string(),
            directions_type: "none".to_string(), // We only need geometry, not turn-by-turn
        }
    }

    /// `/optimized_route` keeps the first and last location fixed and reorders the rest
    fn endpoint(&self, request: &DirectionsRequest) -> String {
        let path = if request.optimize_waypoints && request.waypoints.len() > 1 {
            "optimized_route"
        } else {
            "route"
        };
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl DirectionsProvider for ValhallaClient {
    async fn directions(&self, request: &DirectionsRequest) -> Result<DirectionsResponse, DirectionsError> {
        let body = self.build_route_request(request);
        let url = self.endpoint(request);

        debug!("Requesting route from Valhalla ({}) for {} waypoints", url, request.waypoints.len());

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DirectionsError::Status { status, body });
        }

        let route_response: RouteResponse = response.json().await?;
        parse_trip(route_response.trip, request.waypoints.len())
    }

    fn name(&self) -> &str {
        "Valhalla"
    }
}

fn parse_trip(trip: Trip, waypoint_count: usize) -> Result<DirectionsResponse, DirectionsError> {
    // Optimized trips report each location's original position; first and last are fixed
    let waypoint_order: Vec<usize> = if trip.locations.iter().any(|l| l.original_index.is_some()) {
        let inner = trip.locations.iter().skip(1).take(waypoint_count);
        inner
            .map(|l| match l.original_index {
                Some(idx) if (1..=waypoint_count).contains(&idx) => Ok(idx - 1),
                other => Err(DirectionsError::InvalidResponse(format!(
                    "unexpected original_index {:?}",
                    other
                ))),
            })
            .collect::<Result<_, _>>()?
    } else {
        (0..waypoint_count).collect()
    };

    let mut legs = Vec::with_capacity(trip.legs.len());
    let mut polyline: Vec<Coordinates> = Vec::new();
    for (i, leg) in trip.legs.iter().enumerate() {
        legs.push(RouteLeg {
            distance_meters: leg.summary.length * 1000.0,
            duration_seconds: leg.summary.time,
        });

        let leg_coords = decode_polyline(&leg.shape, SHAPE_PRECISION)?;
        // Skip the first point of subsequent legs (it's the same as last point of previous leg)
        if i == 0 {
            polyline.extend(leg_coords);
        } else {
            polyline.extend(leg_coords.into_iter().skip(1));
        }
    }

    debug!("Received Valhalla route with {} legs, {} points", legs.len(), polyline.len());

    Ok(DirectionsResponse {
        waypoint_order,
        legs,
        polyline,
    })
}

/// Check if Valhalla is healthy by making a simple status request
pub(super) async fn check_health(base_url: &str) -> Result<()> {
    let client = Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let url = format!("{}/status", base_url.trim_end_matches('/'));
    let response = client.get(&url).send().await?;

    if response.status().is_success() {
        Ok(())
    } else {
        anyhow::bail!("Valhalla returned status {}", response.status())
    }
}

// Valhalla API types

#[derive(Debug, Serialize)]
struct RouteRequest {
    locations: Vec<ValhallaLocation>,
    costing: String,
    units: String,
    directions_type: String,
}

#[derive(Debug, Serialize)]
struct ValhallaLocation {
    lat: f64,
    lon: f64,
    /// Radius in meters for snapping to roads
    #[serde(skip_serializing_if = "Option::is_none")]
    radius: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    trip: Trip,
}

#[derive(Debug, Deserialize)]
struct Trip {
    #[serde(default)]
    locations: Vec<TripLocation>,
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct TripLocation {
    #[serde(default)]
    original_index: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    summary: LegSummary,
    /// Encoded polyline shape
    shape: String,
}

#[derive(Debug, Deserialize)]
struct LegSummary {
    /// Kilometers (units="kilometers")
    length: f64,
    /// Seconds
    time: f64,
}
