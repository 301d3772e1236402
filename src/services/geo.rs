//! Geographic calculations

use crate::types::Coordinates;

/// Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Road distance coefficient (straight line to road)
pub const ROAD_COEFFICIENT: f64 = 1.3;

/// Average urban speed in km/h for travel time estimation
pub const AVERAGE_SPEED_KMH: f64 = 30.0;

/// Calculate Haversine distance between two points in kilometers
pub fn haversine_distance(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lng - from.lng).to_radians();

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Estimate road distance from straight-line distance
pub fn road_distance(from: &Coordinates, to: &Coordinates, road_coefficient: f64) -> f64 {
    haversine_distance(from, to) * road_coefficient
}

/// Estimate travel time in minutes for a road distance in km
pub fn travel_time_minutes(road_distance_km: f64, average_speed_kmh: f64) -> f64 {
    if average_speed_kmh <= 0.0 {
        return 0.0;
    }
    (road_distance_km / average_speed_kmh) * 60.0
}

/// Nearest neighbor heuristic over straight-line distance.
///
/// Starting at `origin`, repeatedly visits the closest unvisited stop.
/// Returns indices into `stops` in visit order.
pub fn nearest_neighbor_order(origin: &Coordinates, stops: &[Coordinates]) -> Vec<usize> {
    let mut visited = vec![false; stops.len()];
    let mut order = Vec::with_capacity(stops.len());
    let mut current = *origin;

    for _ in 0..stops.len() {
        let next = stops
            .iter()
            .enumerate()
            .filter(|(i, _)| !visited[*i])
            .map(|(i, stop)| (i, haversine_distance(&current, stop)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        if let Some((idx, _)) = next {
            visited[idx] = true;
            order.push(idx);
            current = stops[idx];
        }
    }

    order
}
