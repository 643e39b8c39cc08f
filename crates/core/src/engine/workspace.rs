//! All documents currently loaded.

use super::snapshot::DocumentSnapshot;
use crate::symbols::SymbolTable;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use groovyscope_api::{Declaration, DocumentId};
use std::sync::Arc;

#[derive(Default)]
pub struct Workspace {
    documents: DashMap<DocumentId, Arc<DocumentSnapshot>>,
    symbols: SymbolTable,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `snapshot` unless a newer version of the document is already
    /// published. The symbol table is updated under the same entry lock, so
    /// writers of one document cannot interleave.
    pub fn publish(&self, snapshot: Arc<DocumentSnapshot>) -> bool {
        match self.documents.entry(snapshot.id.clone()) {
            Entry::Occupied(mut entry) => {
                if entry.get().version > snapshot.version {
                    tracing::debug!(
                        "Ignoring stale version {} of {} (have {})",
                        snapshot.version,
                        snapshot.id,
                        entry.get().version
                    );
                    return false;
                }
                self.record(&snapshot);
                entry.insert(snapshot);
            }
            Entry::Vacant(entry) => {
                self.record(&snapshot);
                entry.insert(snapshot);
            }
        }
        true
    }

    fn record(&self, snapshot: &DocumentSnapshot) {
        let declarations: Arc<[Declaration]> = snapshot.symbols.declarations.clone().into();
        self.symbols.record_document(snapshot.id.clone(), declarations);
    }

    /// Drop the document and its symbol-table entry under the same entry
    /// lock as `publish`.
    pub fn remove(&self, document: &DocumentId) -> bool {
        match self.documents.entry(document.clone()) {
            Entry::Occupied(entry) => {
                self.symbols.remove_document(document);
                entry.remove();
                true
            }
            Entry::Vacant(_) => false,
        }
    }

    /// Documents published while this runs are kept whole.
    pub fn clear(&self) {
        let ids: Vec<DocumentId> = self.documents.iter().map(|e| e.key().clone()).collect();
        for id in &ids {
            self.remove(id);
        }
    }

    pub fn snapshot(&self, document: &DocumentId) -> Option<Arc<DocumentSnapshot>> {
        self.documents.get(document).map(|s| s.value().clone())
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
