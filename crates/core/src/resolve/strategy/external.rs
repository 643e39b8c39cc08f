use crate::external::ScriptRegistry;
use crate::resolve::{ResolutionContext, ResolutionResult, ResolutionStrategy, StrategyFault};
use async_trait::async_trait;
use groovyscope_api::{DeclarationKind, DefinitionLocation, NodeKind};
use std::sync::Arc;

/// Bare calls naming a shared-library script unit (`vars/<name>.groovy`).
pub struct NamedExternalStrategy {
    registry: Arc<dyn ScriptRegistry>,
}

impl NamedExternalStrategy {
    pub const NAME: &'static str = "named_external";

    pub fn new(registry: Arc<dyn ScriptRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ResolutionStrategy for NamedExternalStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn resolve(&self, ctx: &ResolutionContext) -> Result<ResolutionResult, StrategyFault> {
        let Some(NodeKind::MethodCall {
            name,
            has_receiver: false,
        }) = ctx.node().map(|n| &n.kind)
        else {
            return Ok(ResolutionResult::not_found("not a bare call", Self::NAME));
        };

        Ok(match self.registry.lookup(name) {
            Some(path) => ResolutionResult::Found(DefinitionLocation::file(
                path,
                0,
                name.clone(),
                DeclarationKind::Method,
            )),
            None => ResolutionResult::not_found(format!("no script unit `{name}`"), Self::NAME),
        })
    }
}
