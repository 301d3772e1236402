//! Business logic services

pub mod directions;
pub mod fingerprint;
pub mod geo;
pub mod optimizer;
pub mod route_cache;
pub mod validation;
