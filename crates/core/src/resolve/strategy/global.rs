use super::referenced_type;
use crate::engine::Workspace;
use crate::resolve::target::{ClassRef, TargetResolver, TypeLookup, WorkspaceLookup, is_method};
use crate::resolve::{ResolutionContext, ResolutionResult, ResolutionStrategy, StrategyFault};
use async_trait::async_trait;
use groovyscope_api::{DeclarationKind, DefinitionLocation, NodeKind};
use std::sync::Arc;

/// Classes (and their members) declared anywhere in the workspace.
pub struct GlobalClassStrategy {
    workspace: Arc<Workspace>,
    max_depth: usize,
}

impl GlobalClassStrategy {
    pub const NAME: &'static str = "global_class";

    pub fn new(workspace: Arc<Workspace>, max_depth: usize) -> Self {
        Self {
            workspace,
            max_depth,
        }
    }
}

fn decline(reason: impl Into<String>) -> ResolutionResult {
    ResolutionResult::not_found(reason, GlobalClassStrategy::NAME)
}

#[async_trait]
impl ResolutionStrategy for GlobalClassStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn resolve(&self, ctx: &ResolutionContext) -> Result<ResolutionResult, StrategyFault> {
        let Some(node) = ctx.node() else {
            return Ok(decline("target node missing"));
        };
        let snapshot = &ctx.document;
        let lookup = WorkspaceLookup::new(&self.workspace, snapshot);
        let resolver = TargetResolver::new(&lookup, self.max_depth);
        let mut trail = Vec::new();

        let member = match &node.kind {
            NodeKind::MethodCall {
                name,
                has_receiver: true,
            } => Some(resolver.member_of_receiver(
                snapshot, node.id, name, is_method, 0, &mut trail,
            )?),
            NodeKind::PropertyAccess { name } => Some(resolver.member_of_receiver(
                snapshot,
                node.id,
                name,
                DeclarationKind::is_member,
                0,
                &mut trail,
            )?),
            // Inherited from a supertype declared in another document.
            NodeKind::MethodCall {
                name,
                has_receiver: false,
            } => Some(match ClassRef::enclosing(snapshot, node.id) {
                Some(class) => resolver.find_member(&class, name, is_method)?,
                None => None,
            }),
            _ => None,
        };
        if let Some(member) = member {
            return Ok(match member {
                Some(decl) => ResolutionResult::Found(DefinitionLocation::from_declaration(&decl)),
                None => decline("member not declared in workspace"),
            });
        }

        let Some(type_name) = referenced_type(ctx) else {
            return Ok(decline(format!("{} does not name a type", node.kind.label())));
        };
        Ok(match lookup.find_class(&type_name) {
            Some(class) => {
                ResolutionResult::Found(DefinitionLocation::from_declaration(&class.decl))
            }
            None => decline(format!("no workspace class `{type_name}`")),
        })
    }
}
