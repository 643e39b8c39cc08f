//! Collaborators the engine consumes but does not own.

pub mod deps;
pub mod scripts;
pub mod sources;

pub use deps::{DependencyResolver, LibDirectoryResolver, StaticClasspath};
pub use scripts::{ScriptRegistry, VarsDirectoryRegistry};
pub use sources::{Extraction, SourceExtractor, SourcesJarExtractor};

use crate::error::Result;
use groovyscope_api::{DocumentId, SyntaxTree};

/// Turns source text into a syntax tree. Parsing itself happens elsewhere.
pub trait SourceParser: Send + Sync {
    fn parse(&self, document: &DocumentId, text: &str) -> Result<SyntaxTree>;
}
