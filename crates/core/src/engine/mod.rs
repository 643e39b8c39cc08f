//! Engine facade.
//!
//! Owns the shared indices and answers editor queries. Compiling a document
//! builds a fresh [`DocumentSnapshot`] off to the side and publishes it in one
//! step; queries pin the snapshot they started with.

pub mod builder;
pub mod snapshot;
pub mod workspace;

pub use builder::EngineBuilder;
pub use snapshot::DocumentSnapshot;
pub use workspace::Workspace;

use crate::cache::ContentCache;
use crate::classpath::{ClasspathEntry, ClasspathIndex, IndexState};
use crate::config::EngineConfig;
use crate::error::{GroovyscopeError, Result};
use crate::external::{DependencyResolver, ScriptRegistry, SourceParser};
use crate::index::IndexedNode;
use crate::resolve::{ResolutionContext, ResolutionPipeline, ResolutionResult};
use groovyscope_api::{
    Declaration, DefinitionLocation, Diagnostic, DocumentId, Position, SyntaxTree,
};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Outcome of a definition query that produced no location.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("cannot resolve: {0}")]
    InvalidInput(String),
    #[error("no definition found ({strategy}: {reason})")]
    NotFound { reason: String, strategy: String },
    #[error("request cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    /// False when a newer version of the document was already published.
    pub published: bool,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Engine {
    pub(crate) config: EngineConfig,
    pub(crate) workspace: Arc<Workspace>,
    pub(crate) classpath: Arc<ClasspathIndex>,
    pub(crate) cache: Arc<ContentCache>,
    pub(crate) scripts: Arc<dyn ScriptRegistry>,
    pub(crate) parser: Option<Arc<dyn SourceParser>>,
    pub(crate) pipeline: ResolutionPipeline,
}

impl Engine {
    pub fn builder(config: EngineConfig) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn workspace(&self) -> &Arc<Workspace> {
        &self.workspace
    }

    pub fn classpath(&self) -> &Arc<ClasspathIndex> {
        &self.classpath
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    pub fn scripts(&self) -> &Arc<dyn ScriptRegistry> {
        &self.scripts
    }

    pub fn pipeline(&self) -> &ResolutionPipeline {
        &self.pipeline
    }

    // ---- Documents ----

    /// Parse `text` with the configured parser, then compile the tree.
    pub fn compile(&self, document: DocumentId, version: i32, text: &str) -> Result<Compiled> {
        let parser = self
            .parser
            .as_ref()
            .ok_or_else(|| GroovyscopeError::Parsing("no source parser configured".into()))?;
        let tree = parser.parse(&document, text)?;
        Ok(self.compile_tree(document, version, &tree))
    }

    pub fn compile_tree(&self, document: DocumentId, version: i32, tree: &SyntaxTree) -> Compiled {
        let snapshot = Arc::new(DocumentSnapshot::compile(document, version, tree));
        let diagnostics = snapshot.diagnostics.clone();
        let (id, nodes, decls) = (
            snapshot.id.clone(),
            snapshot.index.len(),
            snapshot.symbols.declarations.len(),
        );
        let published = self.workspace.publish(snapshot);
        if published {
            tracing::debug!(
                "Compiled {} v{}: {} nodes, {} declarations",
                id,
                version,
                nodes,
                decls
            );
        }
        Compiled {
            published,
            diagnostics,
        }
    }

    pub fn close(&self, document: &DocumentId) -> bool {
        self.workspace.remove(document)
    }

    /// Drop every document.
    pub fn reset(&self) {
        self.workspace.clear();
        tracing::info!("Workspace reset");
    }

    pub fn snapshot(&self, document: &DocumentId) -> Option<Arc<DocumentSnapshot>> {
        self.workspace.snapshot(document)
    }

    pub fn documents(&self) -> Vec<DocumentId> {
        self.workspace.symbols().all_documents()
    }

    pub fn nodes_for(&self, document: &DocumentId) -> Vec<IndexedNode> {
        self.snapshot(document)
            .map(|s| s.index.nodes().to_vec())
            .unwrap_or_default()
    }

    pub fn class_nodes_for(&self, document: &DocumentId) -> Vec<IndexedNode> {
        self.snapshot(document)
            .map(|s| s.index.class_nodes().cloned().collect())
            .unwrap_or_default()
    }

    pub fn document_symbols(&self, document: &DocumentId) -> Vec<Declaration> {
        self.workspace
            .symbols()
            .declarations(document)
            .map(|d| d.to_vec())
            .unwrap_or_default()
    }

    pub fn find_in_document(&self, document: &DocumentId, query: &str) -> Vec<Declaration> {
        self.workspace.symbols().find_matching(document, query)
    }

    pub fn workspace_symbols(&self, query: &str) -> Vec<Declaration> {
        self.workspace.symbols().search(query)
    }

    // ---- Classpath ----

    /// Install a new classpath; the old index is dropped immediately.
    pub fn update_classpath(&self, paths: Vec<PathBuf>) -> u64 {
        let generation = self.classpath.update_classpath(paths);
        if self.config.eager_classpath_indexing {
            self.classpath.ensure_indexing();
        }
        generation
    }

    pub fn sync_classpath(&self, resolver: &dyn DependencyResolver) -> Result<u64> {
        let paths = resolver.resolve()?;
        Ok(self.update_classpath(paths))
    }

    /// Index the current classpath now and report how many classes it holds.
    pub async fn index_classpath(&self) -> Result<usize> {
        Ok(self.classpath.index_all().await?.len())
    }

    pub fn classpath_state(&self) -> IndexState {
        self.classpath.state()
    }

    pub fn find_classes(&self, prefix: &str, max_results: Option<usize>) -> Vec<ClasspathEntry> {
        let limit = max_results.unwrap_or(self.config.default_prefix_limit);
        self.classpath.find_by_prefix(prefix, limit)
    }

    // ---- Queries ----

    /// Definition for editor coordinates, which may be out of range.
    pub async fn definition_at(
        &self,
        document: &DocumentId,
        line: i64,
        character: i64,
        cancel: CancellationToken,
    ) -> std::result::Result<DefinitionLocation, QueryError> {
        let position = Position::checked(line, character)
            .map_err(|e| QueryError::InvalidInput(e.to_string()))?;
        self.definition(document, position, cancel).await
    }

    pub async fn definition(
        &self,
        document: &DocumentId,
        position: Position,
        cancel: CancellationToken,
    ) -> std::result::Result<DefinitionLocation, QueryError> {
        let snapshot = self
            .workspace
            .snapshot(document)
            .ok_or_else(|| QueryError::InvalidInput(format!("unknown document {document}")))?;
        let target = snapshot
            .index
            .select_node_at(position, self.config.node_selection)
            .ok_or_else(|| QueryError::InvalidInput(format!("no node at {position}")))?;

        let ctx = ResolutionContext::new(target, snapshot, position, cancel);
        let result = self.pipeline.resolve(&ctx).await;
        if ctx.cancel.is_cancelled() {
            return Err(QueryError::Cancelled);
        }
        match result {
            ResolutionResult::Found(location) => Ok(location),
            ResolutionResult::NotFound { reason, strategy } => {
                tracing::debug!("No definition at {}:{}: {}", document, position, reason);
                Err(QueryError::NotFound { reason, strategy })
            }
        }
    }
}
