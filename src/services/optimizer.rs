//! Route optimizer
//!
//! Orchestrates a request through validation, the fingerprint cache and the
//! directions provider:
//!
//! 1. provider availability (`SSR_ENVIRONMENT`, `GOOGLE_MAPS_NOT_LOADED`)
//! 2. coordinate validation (`INVALID_COORDINATES`)
//! 3. passenger check when ordering is requested (`NO_PASSENGERS`)
//! 4. cache lookup; hits never reach the provider
//! 5. provider call under a timeout (`DIRECTIONS_API_ERROR`)
//! 6. result assembly (`UNKNOWN_ERROR` on an inconsistent provider answer)

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::error::OptimizationError;
use crate::services::directions::{DirectionsProvider, DirectionsRequest, DirectionsResponse};
use crate::services::fingerprint::build_key;
use crate::services::route_cache::RouteCache;
use crate::services::validation::validate_request;
use crate::types::{OptimizedRoute, PickupTime, RouteOptimizationOptions};

/// Default upper bound on a single provider call
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Route optimization façade over a directions provider and a route cache
pub struct RouteOptimizer {
    provider: Option<Arc<dyn DirectionsProvider>>,
    cache: Arc<RouteCache>,
    provider_timeout: Duration,
}

impl RouteOptimizer {
    /// `provider = None` means routing is unavailable in this environment
    pub fn new(provider: Option<Arc<dyn DirectionsProvider>>, cache: Arc<RouteCache>) -> Self {
        Self {
            provider,
            cache,
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, provider_timeout: Duration) -> Self {
        self.provider_timeout = provider_timeout;
        self
    }

    pub fn cache(&self) -> &Arc<RouteCache> {
        &self.cache
    }

    pub fn provider_name(&self) -> &str {
        self.provider.as_deref().map_or("none", |p| p.name())
    }

    /// Start background cache maintenance
    pub fn start(&self) {
        self.cache.start();
    }

    /// Stop background cache maintenance
    pub async fn stop(&self) {
        self.cache.stop().await;
    }

    /// Optimize a trip, serving repeated requests from the cache
    pub async fn optimize_route(
        &self,
        options: &RouteOptimizationOptions,
    ) -> Result<OptimizedRoute, OptimizationError> {
        let provider = self.provider.as_deref().ok_or(OptimizationError::SsrEnvironment)?;
        if !provider.is_ready() {
            return Err(OptimizationError::MapsNotLoaded);
        }

        validate_request(options)?;

        if options.optimize_order && options.passengers.is_empty() {
            return Err(OptimizationError::NoPassengers);
        }

        let key = build_key(options);
        match self.cache.get(&key) {
            Some(route) if serves_request(&route, options) => {
                debug!("Route cache hit for {} passengers", options.passengers.len());
                return Ok(with_pickup_times(route, options.departure_time));
            }
            Some(_) => debug!("Cached route does not match request passengers, recomputing"),
            None => debug!("Route cache miss for {} passengers", options.passengers.len()),
        }

        let request = DirectionsRequest {
            origin: options.start_location,
            destination: options.destination,
            waypoints: options.passengers.iter().map(|p| p.position).collect(),
            optimize_waypoints: options.optimize_order,
        };

        let response = match tokio::time::timeout(self.provider_timeout, provider.directions(&request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!("{} directions request failed: {}", provider.name(), e);
                return Err(OptimizationError::DirectionsApi(e.to_string()));
            }
            Err(_) => {
                warn!(
                    "{} directions request timed out after {}s",
                    provider.name(),
                    self.provider_timeout.as_secs_f64()
                );
                return Err(OptimizationError::DirectionsApi(format!(
                    "request timed out after {}s",
                    self.provider_timeout.as_secs_f64()
                )));
            }
        };

        let route = assemble_route(options, response).map_err(|e| {
            error!("Unusable answer from {}: {}", provider.name(), e);
            e
        })?;

        info!(
            "Route optimized via {}: {} passengers, {:.1} km, {:.0} min",
            provider.name(),
            route.ordered_passengers.len(),
            route.total_distance,
            route.total_duration
        );

        self.cache.put(key, route.clone());
        Ok(with_pickup_times(route, options.departure_time))
    }
}

/// A cached route answers a request only if it visits exactly the requested
/// passengers, in caller order when the order is not optimized.
fn serves_request(route: &OptimizedRoute, options: &RouteOptimizationOptions) -> bool {
    if route.ordered_passengers.len() != options.passengers.len() {
        return false;
    }
    if !options.optimize_order {
        return route.ordered_passengers == options.passengers;
    }

    let mut matched = vec![false; options.passengers.len()];
    route.ordered_passengers.iter().all(|cached| {
        let found = options
            .passengers
            .iter()
            .enumerate()
            .position(|(i, p)| !matched[i] && p == cached);
        match found {
            Some(i) => {
                matched[i] = true;
                true
            }
            None => false,
        }
    })
}

/// Turn the provider answer into a route, checking it is consistent with the request
fn assemble_route(
    options: &RouteOptimizationOptions,
    response: DirectionsResponse,
) -> Result<OptimizedRoute, OptimizationError> {
    let n = options.passengers.len();

    let mut seen = vec![false; n];
    for &idx in &response.waypoint_order {
        match seen.get_mut(idx) {
            Some(flag) if !*flag => *flag = true,
            _ => {
                return Err(OptimizationError::Unknown(format!(
                    "waypoint order {:?} is not a permutation of {} passengers",
                    response.waypoint_order, n
                )))
            }
        }
    }
    if response.waypoint_order.len() != n {
        return Err(OptimizationError::Unknown(format!(
            "waypoint order has {} entries for {} passengers",
            response.waypoint_order.len(),
            n
        )));
    }
    if response.legs.len() != n + 1 {
        return Err(OptimizationError::Unknown(format!(
            "expected {} legs, provider returned {}",
            n + 1,
            response.legs.len()
        )));
    }

    let ordered_passengers: Vec<_> = response
        .waypoint_order
        .iter()
        .map(|&i| options.passengers[i].clone())
        .collect();
    let waypoints = ordered_passengers.iter().map(|p| p.position).collect();

    let total_meters: f64 = response.legs.iter().map(|l| l.distance_meters.max(0.0)).sum();
    let leg_durations: Vec<f64> = response
        .legs
        .iter()
        .map(|l| l.duration_seconds.max(0.0) / 60.0)
        .collect();

    Ok(OptimizedRoute {
        waypoints,
        ordered_passengers,
        total_distance: total_meters / 1000.0,
        total_duration: leg_durations.iter().sum(),
        polyline_path: response.polyline,
        leg_durations,
        pickup_times: None,
    })
}

/// Estimate pickups from cumulative leg durations after `departure`
fn with_pickup_times(mut route: OptimizedRoute, departure: Option<DateTime<Utc>>) -> OptimizedRoute {
    let pickup_times = departure.map(|departure| {
        let mut elapsed_minutes = 0.0_f64;
        route
            .ordered_passengers
            .iter()
            .zip(&route.leg_durations)
            .map(|(passenger, minutes)| {
                elapsed_minutes += minutes;
                PickupTime {
                    passenger: passenger.clone(),
                    estimated_at: departure + chrono::Duration::seconds((elapsed_minutes * 60.0).round() as i64),
                }
            })
            .collect()
    });
    route.pickup_times = pickup_times;
    route
}

/// Advice for dispatchers based on how many passengers a trip carries
pub fn generate_optimization_suggestion(passenger_count: usize) -> String {
    if passenger_count > 10 {
        format!(
            "{} passengers is a large group: consider splitting this trip into multiple routes to keep ride times short.",
            passenger_count
        )
    } else if passenger_count > 5 {
        format!(
            "With {} passengers, optimizing the pickup order should noticeably reduce distance and travel time.",
            passenger_count
        )
    } else {
        format!(
            "Only {} passengers: consider consolidating with another nearby trip to use vehicle capacity better.",
            passenger_count
        )
    }
}
