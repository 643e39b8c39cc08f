//! Go-to-definition pipeline.
//!
//! An ordered list of independent strategies. The first `Found` wins and no
//! later strategy runs. Faults and panics inside a strategy are turned into a
//! decline so the chain always continues.

pub mod strategy;
pub mod target;

use crate::engine::DocumentSnapshot;
use crate::error::GroovyscopeError;
use crate::index::IndexedNode;
use async_trait::async_trait;
use futures::FutureExt;
use groovyscope_api::{DefinitionLocation, DocumentId, NodeId, Position};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use strategy::{
    ClasspathStrategy, GlobalClassStrategy, LocalStrategy, NamedExternalStrategy,
};

pub const PIPELINE: &str = "pipeline";

/// Input of one resolution. Strategies read it and never modify it.
#[derive(Clone)]
pub struct ResolutionContext {
    pub target: NodeId,
    /// Pinned snapshot: every strategy sees the same version of the document.
    pub document: Arc<DocumentSnapshot>,
    pub position: Position,
    pub cancel: CancellationToken,
}

impl ResolutionContext {
    pub fn new(
        target: NodeId,
        document: Arc<DocumentSnapshot>,
        position: Position,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            target,
            document,
            position,
            cancel,
        }
    }

    pub fn node(&self) -> Option<&IndexedNode> {
        self.document.index.node(self.target)
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.document.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    Found(DefinitionLocation),
    NotFound { reason: String, strategy: String },
}

impl ResolutionResult {
    pub fn not_found(reason: impl Into<String>, strategy: impl Into<String>) -> Self {
        ResolutionResult::NotFound {
            reason: reason.into(),
            strategy: strategy.into(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ResolutionResult::Found(_))
    }

    pub fn location(&self) -> Option<&DefinitionLocation> {
        match self {
            ResolutionResult::Found(loc) => Some(loc),
            ResolutionResult::NotFound { .. } => None,
        }
    }
}

/// Unexpected failure inside a strategy. Distinct from a decline.
#[derive(Error, Debug)]
pub enum StrategyFault {
    #[error("cycle while resolving `{node}`: {}", trail.join(" -> "))]
    Cycle { node: String, trail: Vec<String> },
    #[error("depth limit {limit} exceeded while resolving `{node}`: {}", trail.join(" -> "))]
    DepthExceeded {
        node: String,
        limit: usize,
        trail: Vec<String>,
    },
    #[error(transparent)]
    Infrastructure(#[from] GroovyscopeError),
    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait ResolutionStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn resolve(&self, ctx: &ResolutionContext) -> Result<ResolutionResult, StrategyFault>;
}

#[derive(Default, Clone)]
pub struct ResolutionPipeline {
    strategies: Vec<Arc<dyn ResolutionStrategy>>,
}

impl ResolutionPipeline {
    pub fn new(strategies: Vec<Arc<dyn ResolutionStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn push(&mut self, strategy: Arc<dyn ResolutionStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub async fn resolve(&self, ctx: &ResolutionContext) -> ResolutionResult {
        let mut result = ResolutionResult::not_found("no strategies", PIPELINE);
        for strategy in &self.strategies {
            if result.is_found() {
                break;
            }
            if ctx.cancel.is_cancelled() {
                return cancelled();
            }

            let name = strategy.name();
            let attempt = AssertUnwindSafe(strategy.resolve(ctx)).catch_unwind();
            let outcome = tokio::select! {
                biased;
                _ = ctx.cancel.cancelled() => return cancelled(),
                outcome = attempt => outcome,
            };

            result = match outcome {
                Ok(Ok(res)) => res,
                Ok(Err(fault)) => {
                    tracing::warn!("Strategy {} faulted: {}", name, fault);
                    ResolutionResult::not_found(fault.to_string(), name)
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    tracing::warn!("Strategy {} panicked: {}", name, message);
                    ResolutionResult::not_found(message, name)
                }
            };

            if let ResolutionResult::NotFound { reason, .. } = &result {
                tracing::debug!("{} declined: {}", name, reason);
            }
        }
        result
    }
}

fn cancelled() -> ResolutionResult {
    ResolutionResult::not_found("cancelled", PIPELINE)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "strategy panicked".to_string()
    }
}
