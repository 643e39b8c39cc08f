//! Lexical scope tree for one document.

use groovyscope_api::{DeclId, DeclarationKind, NodeId, Position, Range};
use std::collections::HashMap;

/// Identifier for a scope (index into the tree's arena).
pub type ScopeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The document; also the implicit script class for top-level methods.
    Module,
    Type,
    Method,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    /// Bound lexically in an enclosing scope.
    Local,
    /// Found among the fields or methods of an enclosing type.
    Member,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub kind: DeclarationKind,
    pub decl: DeclId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolBinding {
    pub decl: DeclId,
    pub kind: ResolutionKind,
    pub scope: ScopeId,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub owner: NodeId,
    pub range: Range,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Class declaration owning a `Type` scope.
    pub declaration: Option<DeclId>,
    bindings: HashMap<String, DeclId>,
    members: Vec<Member>,
}

impl Scope {
    pub fn binding(&self, name: &str) -> Option<DeclId> {
        self.bindings.get(name).copied()
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&str, DeclId)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, name: &str, filter: impl Fn(DeclarationKind) -> bool) -> Option<DeclId> {
        self.members
            .iter()
            .find(|m| m.name == name && filter(m.kind))
            .map(|m| m.decl)
    }

    fn holds_members(&self) -> bool {
        matches!(self.kind, ScopeKind::Type | ScopeKind::Module)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    /// Scope-creating node -> its scope.
    node_to_scope: HashMap<NodeId, ScopeId>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_scope(
        &mut self,
        kind: ScopeKind,
        owner: NodeId,
        range: Range,
        parent: Option<ScopeId>,
    ) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Scope {
            id,
            kind,
            owner,
            range,
            parent,
            children: Vec::new(),
            declaration: None,
            bindings: HashMap::new(),
            members: Vec::new(),
        });
        if let Some(parent) = parent {
            self.scopes[parent].children.push(id);
        }
        self.node_to_scope.insert(owner, id);
        id
    }

    /// Bind `name` in `scope`. A later binding of the same name replaces the
    /// earlier one.
    pub fn bind(&mut self, scope: ScopeId, name: impl Into<String>, decl: DeclId) {
        if let Some(scope) = self.scopes.get_mut(scope) {
            scope.bindings.insert(name.into(), decl);
        }
    }

    pub fn add_member(
        &mut self,
        scope: ScopeId,
        name: impl Into<String>,
        kind: DeclarationKind,
        decl: DeclId,
    ) {
        if let Some(scope) = self.scopes.get_mut(scope) {
            scope.members.push(Member {
                name: name.into(),
                kind,
                decl,
            });
        }
    }

    pub fn set_declaration(&mut self, scope: ScopeId, decl: DeclId) {
        if let Some(scope) = self.scopes.get_mut(scope) {
            scope.declaration = Some(decl);
        }
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    pub fn root(&self) -> Option<ScopeId> {
        if self.scopes.is_empty() { None } else { Some(0) }
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn scope_for_node(&self, node: NodeId) -> Option<ScopeId> {
        self.node_to_scope.get(&node).copied()
    }

    /// `scope` and its parents, innermost first.
    pub fn chain(&self, scope: ScopeId) -> impl Iterator<Item = &Scope> {
        std::iter::successors(self.scope(scope), |s| s.parent.and_then(|p| self.scope(p)))
    }

    pub fn enclosing_type(&self, scope: ScopeId) -> Option<&Scope> {
        self.chain(scope).find(|s| s.kind == ScopeKind::Type)
    }

    /// Lexical bindings first, all the way to the root; only then the
    /// members of the types (and script module) passed on the way.
    pub fn resolve_symbol(&self, name: &str, scope: ScopeId) -> Option<SymbolBinding> {
        let mut member_scopes = Vec::new();
        for current in self.chain(scope) {
            if let Some(decl) = current.binding(name) {
                return Some(SymbolBinding {
                    decl,
                    kind: ResolutionKind::Local,
                    scope: current.id,
                });
            }
            if current.holds_members() {
                member_scopes.push(current.id);
            }
        }

        member_scopes.into_iter().find_map(|id| {
            self.scopes[id].member(name, |_| true).map(|decl| SymbolBinding {
                decl,
                kind: ResolutionKind::Member,
                scope: id,
            })
        })
    }

    /// Member-only lookup, e.g. for a call with an implicit receiver.
    pub fn resolve_member(
        &self,
        name: &str,
        scope: ScopeId,
        filter: impl Fn(DeclarationKind) -> bool,
    ) -> Option<SymbolBinding> {
        self.chain(scope)
            .filter(|s| s.holds_members())
            .find_map(|s| {
                s.member(name, &filter).map(|decl| SymbolBinding {
                    decl,
                    kind: ResolutionKind::Member,
                    scope: s.id,
                })
            })
    }

    /// Most specific scope whose range contains `pos`.
    pub fn scope_at(&self, pos: Position) -> Option<ScopeId> {
        self.root().and_then(|root| self.scope_at_from(root, pos))
    }

    fn scope_at_from(&self, id: ScopeId, pos: Position) -> Option<ScopeId> {
        let scope = &self.scopes[id];
        for child in &scope.children {
            if let Some(found) = self.scope_at_from(*child, pos) {
                return Some(found);
            }
        }
        scope.range.contains(pos).then_some(id)
    }
}
