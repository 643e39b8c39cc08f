use crate::resolve::target::{ClassRef, DocumentLookup, TargetResolver, TypeLookup, is_method};
use crate::resolve::{ResolutionContext, ResolutionResult, ResolutionStrategy, StrategyFault};
use async_trait::async_trait;
use groovyscope_api::{Declaration, DeclarationKind, DefinitionLocation, NodeKind};

/// Definitions inside the queried document.
///
/// Declines for imports, for names that only resolve to an import, for calls
/// with nothing declared here, and for type usages whose class lives
/// elsewhere; those are left to the workspace and classpath strategies.
pub struct LocalStrategy {
    max_depth: usize,
}

impl LocalStrategy {
    pub const NAME: &'static str = "local";

    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

fn found(decl: &Declaration) -> ResolutionResult {
    ResolutionResult::Found(DefinitionLocation::from_declaration(decl))
}

fn decline(reason: impl Into<String>) -> ResolutionResult {
    ResolutionResult::not_found(reason, LocalStrategy::NAME)
}

#[async_trait]
impl ResolutionStrategy for LocalStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn resolve(&self, ctx: &ResolutionContext) -> Result<ResolutionResult, StrategyFault> {
        let Some(node) = ctx.node() else {
            return Ok(decline("target node missing"));
        };
        let snapshot = &ctx.document;
        let symbols = &snapshot.symbols;
        let lookup = DocumentLookup::new(snapshot.clone());
        let resolver = TargetResolver::new(&lookup, self.max_depth);

        // Parameters and loop variables hang off their owner's node; pick the
        // one under the cursor before falling back to the owner itself.
        let own = symbols.by_node.get(&node.id).copied();
        if let Some(param) = symbols
            .declarations
            .iter()
            .filter(|d| d.node == node.id && Some(d.id) != own)
            .find(|d| d.range.contains(ctx.position))
        {
            return Ok(found(param));
        }

        let result = match &node.kind {
            NodeKind::Import { .. } => decline("import reference"),
            NodeKind::Class { .. }
            | NodeKind::Method { .. }
            | NodeKind::Field { .. }
            | NodeKind::Variable { .. } => match symbols.declaration_for_node(node.id) {
                Some(decl) => found(decl),
                None => decline("declaration not recorded"),
            },
            NodeKind::VariableRef { name } => {
                let binding = symbols
                    .scope_of(&snapshot.index, node.id)
                    .and_then(|scope| symbols.tree.resolve_symbol(name, scope))
                    .and_then(|b| symbols.declaration(b.decl));
                match binding {
                    Some(decl) if decl.kind == DeclarationKind::Import => {
                        decline(format!("`{name}` resolves to an import"))
                    }
                    Some(decl) => found(decl),
                    None => decline(format!("no local binding for `{name}`")),
                }
            }
            NodeKind::MethodCall {
                name,
                has_receiver: false,
            } => match resolver.implicit_member(snapshot, node.id, name, is_method)? {
                Some(decl) if decl.document == snapshot.id => found(&decl),
                _ => decline(format!("call `{name}` not declared in document")),
            },
            NodeKind::MethodCall {
                name,
                has_receiver: true,
            } => {
                let mut trail = Vec::new();
                match resolver.member_of_receiver(
                    snapshot, node.id, name, is_method, 0, &mut trail,
                )? {
                    Some(decl) => found(&decl),
                    None => decline(format!("receiver of `{name}` not typed locally")),
                }
            }
            NodeKind::PropertyAccess { name } => {
                let mut trail = Vec::new();
                match resolver.member_of_receiver(
                    snapshot,
                    node.id,
                    name,
                    DeclarationKind::is_member,
                    0,
                    &mut trail,
                )? {
                    Some(decl) => found(&decl),
                    None => decline(format!("receiver of `{name}` not typed locally")),
                }
            }
            NodeKind::TypeRef { name: type_name } | NodeKind::ConstructorCall { type_name } => {
                match lookup.find_class(type_name) {
                    Some(class) => found(&class.decl),
                    None => decline(format!("type `{type_name}` not declared in document")),
                }
            }
            NodeKind::This => match ClassRef::enclosing(snapshot, node.id) {
                Some(class) => found(&class.decl),
                None => decline("`this` outside a class"),
            },
            other => decline(format!("no local definition for {}", other.label())),
        };
        Ok(result)
    }
}
