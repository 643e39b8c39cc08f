pub mod builder;
pub mod tree;

pub use builder::{DocumentSymbols, ImportInfo, ScopeBuilder};
pub use tree::{Member, ResolutionKind, Scope, ScopeId, ScopeKind, ScopeTree, SymbolBinding};
