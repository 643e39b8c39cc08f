pub mod error;
pub mod logging;

pub mod cache;
pub mod classpath;
pub mod config;
pub mod engine;
pub mod external;
pub mod index;
pub mod resolve;
pub mod scope;
pub mod symbols;

pub use config::{EngineConfig, NodeSelectionPolicy};
pub use engine::{Compiled, Engine, EngineBuilder, QueryError};
pub use error::{GroovyscopeError, Result};
