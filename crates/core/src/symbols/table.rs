//! Workspace symbol table.
//!
//! Per-document declaration lists plus a flattened name index. Both live
//! behind one lock so a reader never sees a document half replaced.

use groovyscope_api::{DeclId, Declaration, DeclarationKind, DocumentId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct Inner {
    documents: HashMap<DocumentId, Arc<[Declaration]>>,
    by_name: HashMap<String, Vec<(DocumentId, DeclId)>>,
}

impl Inner {
    fn unlink(&mut self, document: &DocumentId) -> Option<Arc<[Declaration]>> {
        let old = self.documents.remove(document)?;
        for decl in old.iter() {
            if let Some(entries) = self.by_name.get_mut(&decl.name) {
                entries.retain(|(doc, _)| doc != document);
                if entries.is_empty() {
                    self.by_name.remove(&decl.name);
                }
            }
        }
        Some(old)
    }

    fn resolve(&self, document: &DocumentId, id: DeclId) -> Option<&Declaration> {
        self.documents
            .get(document)
            .and_then(|decls| decls.get(id.index()))
    }
}

#[derive(Default)]
pub struct SymbolTable {
    inner: RwLock<Inner>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything known about `document` in one step.
    pub fn record_document(&self, document: DocumentId, declarations: Arc<[Declaration]>) {
        let mut inner = self.inner.write();
        inner.unlink(&document);
        for decl in declarations.iter() {
            inner
                .by_name
                .entry(decl.name.clone())
                .or_default()
                .push((document.clone(), decl.id));
        }
        inner.documents.insert(document, declarations);
    }

    pub fn remove_document(&self, document: &DocumentId) -> bool {
        self.inner.write().unlink(document).is_some()
    }

    pub fn declarations(&self, document: &DocumentId) -> Option<Arc<[Declaration]>> {
        self.inner.read().documents.get(document).cloned()
    }

    /// First declaration named `name`, in declaration order.
    pub fn find_exact(&self, document: &DocumentId, name: &str) -> Option<Declaration> {
        let inner = self.inner.read();
        inner
            .documents
            .get(document)?
            .iter()
            .find(|d| d.name == name)
            .cloned()
    }

    /// Case-sensitive substring match within one document, in declaration
    /// order.
    pub fn find_matching(&self, document: &DocumentId, query: &str) -> Vec<Declaration> {
        let inner = self.inner.read();
        inner
            .documents
            .get(document)
            .map(|decls| {
                decls
                    .iter()
                    .filter(|d| d.name.contains(query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn all_documents(&self) -> Vec<DocumentId> {
        let mut docs: Vec<_> = self.inner.read().documents.keys().cloned().collect();
        docs.sort();
        docs
    }

    pub fn document_count(&self) -> usize {
        self.inner.read().documents.len()
    }

    /// Workspace-wide exact lookup, ordered by document then declaration.
    pub fn find_by_name(&self, name: &str) -> Vec<Declaration> {
        let inner = self.inner.read();
        let mut found: Vec<Declaration> = inner
            .by_name
            .get(name)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(doc, id)| inner.resolve(doc, *id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        found.sort_by(|a, b| a.document.cmp(&b.document).then(a.id.cmp(&b.id)));
        found
    }

    /// Workspace-wide substring search. A blank query returns nothing.
    pub fn search(&self, query: &str) -> Vec<Declaration> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let inner = self.inner.read();
        let mut found: Vec<Declaration> = inner
            .by_name
            .iter()
            .filter(|(name, _)| name.contains(query))
            .flat_map(|(_, entries)| entries.iter())
            .filter_map(|(doc, id)| inner.resolve(doc, *id))
            .filter(|d| d.kind != DeclarationKind::Import)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.document.cmp(&b.document))
                .then(a.id.cmp(&b.id))
        });
        found
    }
}
