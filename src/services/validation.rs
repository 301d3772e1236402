//! Input validation for addresses and coordinates
//!
//! Predicates here never panic and never error; the optimizer turns a failed
//! predicate into `INVALID_COORDINATES` via [`validate_request`].

use crate::error::OptimizationError;
use crate::types::{Coordinates, RouteOptimizationOptions};

/// Shortest accepted address, in characters after trimming
pub const MIN_ADDRESS_LEN: usize = 5;

/// Check that a coordinate pair is finite and inside WGS84 bounds
pub fn validate_coordinates(coordinates: &Coordinates) -> bool {
    coordinates.lat.is_finite()
        && coordinates.lng.is_finite()
        && (-90.0..=90.0).contains(&coordinates.lat)
        && (-180.0..=180.0).contains(&coordinates.lng)
}

/// Check an address together with its geocoded position
pub fn validate_address(address: &str, coordinates: Option<&Coordinates>) -> bool {
    if address.trim().chars().count() < MIN_ADDRESS_LEN {
        return false;
    }

    match coordinates {
        Some(c) => validate_coordinates(c),
        None => false,
    }
}

/// Validate every point of a request before any cache or network access
pub fn validate_request(options: &RouteOptimizationOptions) -> Result<(), OptimizationError> {
    if !validate_coordinates(&options.start_location) {
        return Err(OptimizationError::InvalidCoordinates(format!(
            "start location {},{}",
            options.start_location.lat, options.start_location.lng
        )));
    }

    if !validate_coordinates(&options.destination) {
        return Err(OptimizationError::InvalidCoordinates(format!(
            "destination {},{}",
            options.destination.lat, options.destination.lng
        )));
    }

    if let Some(p) = options.passengers.iter().find(|p| !validate_coordinates(&p.position)) {
        return Err(OptimizationError::InvalidCoordinates(format!(
            "passenger {} at {},{}",
            p.id, p.position.lat, p.position.lng
        )));
    }

    Ok(())
}
