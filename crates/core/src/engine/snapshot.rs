//! Immutable compiled state of one document version.

use crate::index::DocumentIndex;
use crate::scope::{DocumentSymbols, ScopeBuilder};
use groovyscope_api::{Diagnostic, DocumentId, SyntaxTree};

#[derive(Debug)]
pub struct DocumentSnapshot {
    pub id: DocumentId,
    pub version: i32,
    pub index: DocumentIndex,
    pub symbols: DocumentSymbols,
    pub diagnostics: Vec<Diagnostic>,
}

impl DocumentSnapshot {
    /// Index the tree and build its scopes in one pass each.
    pub fn compile(id: DocumentId, version: i32, tree: &SyntaxTree) -> Self {
        let index = DocumentIndex::build(id.clone(), &tree.root);
        let symbols = ScopeBuilder::new(&index).build();
        Self {
            id,
            version,
            index,
            symbols,
            diagnostics: tree.diagnostics.clone(),
        }
    }

    pub fn package(&self) -> Option<&str> {
        self.symbols.package.as_deref()
    }
}
