//! Shared data model for the groovyscope engine: positions, syntax trees,
//! declarations and definition locations.

pub mod error;
pub mod models;

pub use error::{ApiError, ApiResult};
pub use models::*;
