//! Route optimization error taxonomy

use thiserror::Error;

/// Errors surfaced by [`crate::services::optimizer::RouteOptimizer`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizationError {
    /// No directions provider exists in this environment
    #[error("directions provider is not available in this environment")]
    SsrEnvironment,

    /// Provider client exists but has not finished initializing
    #[error("directions provider client is not loaded yet")]
    MapsNotLoaded,

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("route optimization requested without passengers")]
    NoPassengers,

    #[error("directions provider failed: {0}")]
    DirectionsApi(String),

    #[error("unexpected routing error: {0}")]
    Unknown(String),
}

impl OptimizationError {
    /// Machine-readable error code used on the wire
    pub const fn code(&self) -> &'static str {
        match self {
            OptimizationError::SsrEnvironment => "SSR_ENVIRONMENT",
            OptimizationError::MapsNotLoaded => "GOOGLE_MAPS_NOT_LOADED",
            OptimizationError::InvalidCoordinates(_) => "INVALID_COORDINATES",
            OptimizationError::NoPassengers => "NO_PASSENGERS",
            OptimizationError::DirectionsApi(_) => "DIRECTIONS_API_ERROR",
            OptimizationError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// Environment and upstream failures may succeed on a later attempt;
    /// bad input never will.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            OptimizationError::SsrEnvironment
                | OptimizationError::MapsNotLoaded
                | OptimizationError::DirectionsApi(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(OptimizationError::SsrEnvironment.code(), "SSR_ENVIRONMENT");
        assert_eq!(OptimizationError::MapsNotLoaded.code(), "GOOGLE_MAPS_NOT_LOADED");
        assert_eq!(OptimizationError::InvalidCoordinates("x".into()).code(), "INVALID_COORDINATES");
        assert_eq!(OptimizationError::NoPassengers.code(), "NO_PASSENGERS");
        assert_eq!(OptimizationError::DirectionsApi("x".into()).code(), "DIRECTIONS_API_ERROR");
        assert_eq!(OptimizationError::Unknown("x".into()).code(), "UNKNOWN_ERROR");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(OptimizationError::MapsNotLoaded.is_retryable());
        assert!(OptimizationError::DirectionsApi("timeout".into()).is_retryable());
        assert!(!OptimizationError::NoPassengers.is_retryable());
        assert!(!OptimizationError::InvalidCoordinates("start".into()).is_retryable());
        assert!(!OptimizationError::Unknown("bug".into()).is_retryable());
    }

    #[test]
    fn test_display_carries_detail() {
        let err = OptimizationError::DirectionsApi("status ZERO_RESULTS".into());
        assert!(err.to_string().contains("ZERO_RESULTS"));
    }
}
