//! Typing of member-reference receivers and member lookup through the
//! supertype chain.

use super::StrategyFault;
use crate::engine::{DocumentSnapshot, Workspace};
use crate::scope::{DocumentSymbols, ScopeId};
use groovyscope_api::{
    DeclId, Declaration, DeclarationKind, DocumentId, NodeId, NodeKind, package_of, simple_name,
};
use std::collections::HashSet;
use std::sync::Arc;

/// A type name as written, and its FQN when the document's imports pin it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    pub simple: String,
    pub fqn: Option<String>,
}

/// Qualify `name` against the document's single-type imports.
pub fn qualify(symbols: &DocumentSymbols, name: &str) -> TypeName {
    let base = name.split('<').next().unwrap_or(name).trim();
    if base.contains('.') {
        return TypeName {
            simple: simple_name(base).to_string(),
            fqn: Some(base.to_string()),
        };
    }
    let imported = symbols
        .imports
        .iter()
        .find(|i| !i.is_wildcard && !i.is_static && i.local_name() == base);
    match imported {
        Some(import) => TypeName {
            simple: simple_name(&import.path).to_string(),
            fqn: Some(import.path.clone()),
        },
        None => TypeName {
            simple: simple_name(base).to_string(),
            fqn: None,
        },
    }
}

/// Whether `type_name` carries no static information.
pub fn is_dynamic(type_name: &str) -> bool {
    matches!(type_name.trim(), "" | "def" | "var" | "void" | "Object")
}

/// A class declaration together with the snapshot holding it.
#[derive(Debug, Clone)]
pub struct ClassRef {
    pub snapshot: Arc<DocumentSnapshot>,
    pub decl: Declaration,
}

impl ClassRef {
    pub fn super_class(&self) -> Option<&str> {
        match &self.snapshot.index.node(self.decl.node)?.kind {
            NodeKind::Class { super_class, .. } => super_class.as_deref(),
            _ => None,
        }
    }

    fn type_scope(&self) -> Option<ScopeId> {
        self.snapshot.symbols.tree.scope_for_node(self.decl.node)
    }

    fn key(&self) -> (DocumentId, DeclId) {
        (self.decl.document.clone(), self.decl.id)
    }

    /// Enclosing class of `node` in `snapshot`.
    pub fn enclosing(snapshot: &Arc<DocumentSnapshot>, node: NodeId) -> Option<Self> {
        let class = snapshot.index.enclosing_class(node)?;
        let decl = snapshot.symbols.declaration_for_node(class.id)?.clone();
        Some(Self {
            snapshot: snapshot.clone(),
            decl,
        })
    }
}

/// Where class names are looked up.
pub trait TypeLookup: Send + Sync {
    fn find_class(&self, name: &str) -> Option<ClassRef>;
}

/// Classes declared in one document.
pub struct DocumentLookup {
    snapshot: Arc<DocumentSnapshot>,
}

impl DocumentLookup {
    pub fn new(snapshot: Arc<DocumentSnapshot>) -> Self {
        Self { snapshot }
    }
}

impl TypeLookup for DocumentLookup {
    fn find_class(&self, name: &str) -> Option<ClassRef> {
        let wanted = qualify(&self.snapshot.symbols, name);
        self.snapshot
            .symbols
            .classes()
            .find(|c| {
                c.name == wanted.simple
                    && wanted
                        .fqn
                        .as_ref()
                        .is_none_or(|fqn| *fqn == c.qualified_name())
            })
            .map(|decl| ClassRef {
                snapshot: self.snapshot.clone(),
                decl: decl.clone(),
            })
    }
}

/// Classes declared anywhere in the workspace, ranked from the point of view
/// of `origin`.
pub struct WorkspaceLookup<'a> {
    workspace: &'a Workspace,
    origin: &'a Arc<DocumentSnapshot>,
}

impl<'a> WorkspaceLookup<'a> {
    pub fn new(workspace: &'a Workspace, origin: &'a Arc<DocumentSnapshot>) -> Self {
        Self { workspace, origin }
    }

    /// Candidates in preference order: the imported FQN, on-demand imports,
    /// the origin's package, then anything in document order. Same order as
    /// the classpath candidates.
    pub fn rank(&self, name: &str) -> Vec<Declaration> {
        let wanted = qualify(&self.origin.symbols, name);
        let candidates: Vec<Declaration> = self
            .workspace
            .symbols()
            .find_by_name(&wanted.simple)
            .into_iter()
            .filter(|d| d.kind == DeclarationKind::Class)
            .collect();

        if let Some(fqn) = &wanted.fqn {
            return candidates
                .into_iter()
                .filter(|d| d.qualified_name() == *fqn)
                .collect();
        }

        let package = self.origin.package();
        let wildcards: Vec<&str> = self
            .origin
            .symbols
            .imports
            .iter()
            .filter_map(|i| i.wildcard_package())
            .collect();
        let rank = |d: &Declaration| -> u8 {
            let pkg = package_of(&d.qualified_name()).map(str::to_string);
            if pkg.as_deref().is_some_and(|p| wildcards.contains(&p)) {
                0
            } else if pkg.as_deref() == package {
                1
            } else {
                2
            }
        };
        let mut ranked = candidates;
        // Stable: ties keep document order.
        ranked.sort_by_key(|d| rank(d));
        ranked
    }
}

impl TypeLookup for WorkspaceLookup<'_> {
    fn find_class(&self, name: &str) -> Option<ClassRef> {
        self.rank(name).into_iter().find_map(|decl| {
            let snapshot = self.workspace.snapshot(&decl.document)?;
            // The table may briefly be ahead of or behind the snapshot map.
            let current = snapshot.symbols.declaration(decl.id)?.clone();
            (current.name == decl.name && current.kind == DeclarationKind::Class).then_some(
                ClassRef {
                    decl: current,
                    snapshot,
                },
            )
        })
    }
}

pub fn is_method(kind: DeclarationKind) -> bool {
    kind == DeclarationKind::Method
}

pub fn is_field(kind: DeclarationKind) -> bool {
    kind == DeclarationKind::Field
}

/// Receiver typing and member lookup over a [`TypeLookup`].
pub struct TargetResolver<'a> {
    lookup: &'a dyn TypeLookup,
    max_depth: usize,
}

impl<'a> TargetResolver<'a> {
    pub fn new(lookup: &'a dyn TypeLookup, max_depth: usize) -> Self {
        Self { lookup, max_depth }
    }

    pub fn lookup(&self) -> &dyn TypeLookup {
        self.lookup
    }

    /// Static type of the expression at `node`, when it can be read off
    /// declarations.
    pub fn expression_type(
        &self,
        snapshot: &Arc<DocumentSnapshot>,
        node: NodeId,
        depth: usize,
        trail: &mut Vec<String>,
    ) -> Result<Option<String>, StrategyFault> {
        let Some(indexed) = snapshot.index.node(node) else {
            return Ok(None);
        };
        let label = match indexed.kind.name() {
            Some(name) => format!("{} {}", indexed.kind.label(), name),
            None => indexed.kind.label().to_string(),
        };
        trail.push(label.clone());
        if depth > self.max_depth {
            return Err(StrategyFault::DepthExceeded {
                node: label,
                limit: self.max_depth,
                trail: trail.clone(),
            });
        }

        let ty = match &indexed.kind {
            NodeKind::This => snapshot
                .index
                .enclosing_class(node)
                .and_then(|c| c.kind.name().map(str::to_string)),
            NodeKind::VariableRef { name } => variable_type(snapshot, node, name),
            NodeKind::TypeRef { name } => Some(name.clone()),
            NodeKind::ConstructorCall { type_name } => Some(type_name.clone()),
            NodeKind::MethodCall { name, has_receiver } => {
                let decl = if *has_receiver {
                    self.member_of_receiver(snapshot, node, name, is_method, depth + 1, trail)?
                } else {
                    self.implicit_member(snapshot, node, name, is_method)?
                };
                decl.and_then(|d| d.type_name)
            }
            NodeKind::PropertyAccess { name } => self
                .member_of_receiver(snapshot, node, name, is_field, depth + 1, trail)?
                .and_then(|d| d.type_name),
            NodeKind::Expression => match snapshot.index.first_child(node) {
                Some(inner) => self.expression_type(snapshot, inner.id, depth + 1, trail)?,
                None => None,
            },
            _ => None,
        };
        Ok(ty.filter(|t| !is_dynamic(t)))
    }

    /// `receiver.name` where the receiver is the first child of `node`.
    pub fn member_of_receiver(
        &self,
        snapshot: &Arc<DocumentSnapshot>,
        node: NodeId,
        name: &str,
        filter: fn(DeclarationKind) -> bool,
        depth: usize,
        trail: &mut Vec<String>,
    ) -> Result<Option<Declaration>, StrategyFault> {
        let Some(receiver) = snapshot.index.first_child(node) else {
            return Ok(None);
        };
        let Some(ty) = self.expression_type(snapshot, receiver.id, depth, trail)? else {
            return Ok(None);
        };
        let Some(class) = self.lookup.find_class(&ty) else {
            return Ok(None);
        };
        self.find_member(&class, name, filter)
    }

    /// A member referenced without a receiver: enclosing scopes first, then
    /// the supertypes of the enclosing class.
    pub fn implicit_member(
        &self,
        snapshot: &Arc<DocumentSnapshot>,
        node: NodeId,
        name: &str,
        filter: fn(DeclarationKind) -> bool,
    ) -> Result<Option<Declaration>, StrategyFault> {
        let symbols = &snapshot.symbols;
        if let Some(scope) = symbols.scope_of(&snapshot.index, node)
            && let Some(binding) = symbols.tree.resolve_member(name, scope, filter)
        {
            return Ok(symbols.declaration(binding.decl).cloned());
        }
        match ClassRef::enclosing(snapshot, node) {
            Some(class) => self.find_member(&class, name, filter),
            None => Ok(None),
        }
    }

    /// Member `name` of `class` or of the first supertype declaring it.
    pub fn find_member(
        &self,
        class: &ClassRef,
        name: &str,
        filter: fn(DeclarationKind) -> bool,
    ) -> Result<Option<Declaration>, StrategyFault> {
        let mut visited = HashSet::new();
        let mut trail = Vec::new();
        let mut current = Some(class.clone());

        while let Some(class) = current {
            trail.push(class.decl.qualified_name());
            if !visited.insert(class.key()) {
                return Err(StrategyFault::Cycle {
                    node: name.to_string(),
                    trail,
                });
            }
            if trail.len() > self.max_depth {
                return Err(StrategyFault::DepthExceeded {
                    node: name.to_string(),
                    limit: self.max_depth,
                    trail,
                });
            }

            let found = class
                .type_scope()
                .and_then(|scope| class.snapshot.symbols.tree.scope(scope))
                .and_then(|scope| scope.member(name, filter))
                .and_then(|decl| class.snapshot.symbols.declaration(decl));
            if let Some(decl) = found {
                return Ok(Some(decl.clone()));
            }

            current = class
                .super_class()
                .and_then(|sup| self.lookup.find_class(sup));
        }
        Ok(None)
    }
}

/// Declared type of a variable reference; a bare capitalized name is taken as
/// a type (static member access).
fn variable_type(snapshot: &DocumentSnapshot, node: NodeId, name: &str) -> Option<String> {
    let symbols = &snapshot.symbols;
    let binding = symbols
        .scope_of(&snapshot.index, node)
        .and_then(|scope| symbols.tree.resolve_symbol(name, scope));
    match binding.and_then(|b| symbols.declaration(b.decl)) {
        Some(decl) => match decl.kind {
            DeclarationKind::Class => Some(decl.name.clone()),
            _ => decl.type_name.clone(),
        },
        None => name
            .starts_with(|c: char| c.is_ascii_uppercase())
            .then(|| name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groovyscope_api::{Range, SyntaxNode, SyntaxTree};

    fn class(
        name: &str,
        super_class: Option<&str>,
        line: u32,
        children: Vec<SyntaxNode>,
    ) -> SyntaxNode {
        SyntaxNode::new(
            NodeKind::Class {
                name: name.into(),
                super_class: super_class.map(str::to_string),
                interfaces: vec![],
            },
            Range::new(line, 0, line + 5, 1),
        )
        .with_children(children)
    }

    fn method(name: &str, line: u32) -> SyntaxNode {
        SyntaxNode::new(
            NodeKind::Method {
                name: name.into(),
                return_type: Some("String".into()),
                parameters: vec![],
            },
            Range::new(line, 4, line, 30),
        )
    }

    fn snapshot(root: SyntaxNode) -> Arc<DocumentSnapshot> {
        Arc::new(DocumentSnapshot::compile(
            DocumentId::new("file:///a.groovy"),
            1,
            &SyntaxTree::new(root),
        ))
    }

    #[test]
    fn test_member_found_on_supertype() {
        let root = SyntaxNode::new(NodeKind::Module, Range::new(0, 0, 20, 0)).with_children([
            class("Base", None, 0, vec![method("greet", 1)]),
            class("Child", Some("Base"), 10, vec![]),
        ]);
        let snap = snapshot(root);
        let lookup = DocumentLookup::new(snap.clone());
        let resolver = TargetResolver::new(&lookup, 8);

        let child = lookup.find_class("Child").unwrap();
        assert_eq!(child.super_class(), Some("Base"));
        let found = resolver.find_member(&child, "greet", is_method).unwrap().unwrap();
        assert_eq!(found.container.as_deref(), Some("Base"));
        assert!(resolver.find_member(&child, "missing", is_method).unwrap().is_none());
    }

    #[test]
    fn test_cyclic_hierarchy_is_a_bounded_fault() {
        let root = SyntaxNode::new(NodeKind::Module, Range::new(0, 0, 20, 0)).with_children([
            class("A", Some("B"), 0, vec![]),
            class("B", Some("A"), 10, vec![]),
        ]);
        let snap = snapshot(root);
        let lookup = DocumentLookup::new(snap);
        let resolver = TargetResolver::new(&lookup, 8);

        let a = lookup.find_class("A").unwrap();
        match resolver.find_member(&a, "run", is_method) {
            Err(StrategyFault::Cycle { node, trail }) => {
                assert_eq!(node, "run");
                assert_eq!(trail, vec!["A", "B", "A"]);
            }
            other => panic!("expected cycle fault, got {other:?}"),
        }
    }

    #[test]
    fn test_dynamic_types() {
        assert!(is_dynamic("def"));
        assert!(is_dynamic("void"));
        assert!(!is_dynamic("String"));
    }
}
