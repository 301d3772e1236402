//! Route optimization types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic point (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A passenger to be picked up on the way to the destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    pub id: String,
    pub position: Coordinates,
}

/// Request to optimize a trip
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOptimizationOptions {
    pub start_location: Coordinates,
    pub destination: Coordinates,
    #[serde(default)]
    pub passengers: Vec<Passenger>,
    #[serde(default)]
    pub optimize_order: bool,
    /// When set, pickup times are estimated from this departure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<DateTime<Utc>>,
}

/// Estimated pickup of one passenger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupTime {
    pub passenger: Passenger,
    pub estimated_at: DateTime<Utc>,
}

/// Result of route optimization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedRoute {
    /// Passenger positions in visiting order
    pub waypoints: Vec<Coordinates>,
    pub ordered_passengers: Vec<Passenger>,
    /// Kilometers
    pub total_distance: f64,
    /// Minutes
    pub total_duration: f64,
    pub polyline_path: Vec<Coordinates>,
    /// Minutes spent on each leg, in visiting order (start → first stop, ..., last stop → destination)
    #[serde(default)]
    pub leg_durations: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_times: Option<Vec<PickupTime>>,
}
