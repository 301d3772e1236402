//! Type definitions

pub mod messages;
pub mod route;

pub use messages::*;
pub use route::*;
