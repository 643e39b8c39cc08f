//! Scope builder.
//!
//! Walks an indexed document to produce its scope tree and declaration list.

use super::tree::{ScopeId, ScopeKind, ScopeTree};
use crate::index::DocumentIndex;
use groovyscope_api::{
    DeclId, Declaration, DeclarationKind, NodeId, NodeKind, Parameter, Range, simple_name,
};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    pub path: String,
    pub alias: Option<String>,
    pub is_static: bool,
    pub is_wildcard: bool,
}

impl ImportInfo {
    /// Name the import introduces into the document.
    pub fn local_name(&self) -> &str {
        self.alias
            .as_deref()
            .unwrap_or_else(|| simple_name(&self.path))
    }

    /// Package covered by an on-demand import (`import a.b.*`).
    pub fn wildcard_package(&self) -> Option<&str> {
        if !self.is_wildcard {
            return None;
        }
        Some(self.path.strip_suffix(".*").unwrap_or(&self.path))
    }
}

/// Everything the scope walk learns about one document.
#[derive(Debug, Clone, Default)]
pub struct DocumentSymbols {
    pub tree: ScopeTree,
    pub declarations: Vec<Declaration>,
    pub package: Option<String>,
    pub imports: Vec<ImportInfo>,
    /// Declaring node -> declaration (parameters excluded).
    pub by_node: HashMap<NodeId, DeclId>,
}

impl DocumentSymbols {
    pub fn declaration(&self, id: DeclId) -> Option<&Declaration> {
        self.declarations.get(id.index())
    }

    pub fn declaration_for_node(&self, node: NodeId) -> Option<&Declaration> {
        self.by_node.get(&node).and_then(|id| self.declaration(*id))
    }

    /// Innermost scope enclosing `node` (the node's own scope if it opens one).
    pub fn scope_of(&self, index: &DocumentIndex, node: NodeId) -> Option<ScopeId> {
        self.tree.scope_for_node(node).or_else(|| {
            index
                .ancestors(node)
                .find_map(|n| self.tree.scope_for_node(n.id))
        })
    }

    pub fn classes(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations
            .iter()
            .filter(|d| d.kind == DeclarationKind::Class)
    }
}

pub struct ScopeBuilder<'a> {
    index: &'a DocumentIndex,
    out: DocumentSymbols,
}

impl<'a> ScopeBuilder<'a> {
    pub fn new(index: &'a DocumentIndex) -> Self {
        Self {
            index,
            out: DocumentSymbols::default(),
        }
    }

    pub fn build(mut self) -> DocumentSymbols {
        if let Some(root) = self.index.root() {
            let root_id = root.id;
            let scope = self
                .out
                .tree
                .push_scope(ScopeKind::Module, root_id, root.range, None);
            self.visit_children(root_id, scope, None);
        }
        self.out
    }

    fn visit_children(&mut self, node: NodeId, scope: ScopeId, class: Option<&str>) {
        let children = match self.index.node(node) {
            Some(n) => n.children.clone(),
            None => return,
        };
        for child in children {
            self.visit_node(child, scope, class);
        }
    }

    fn visit_node(&mut self, id: NodeId, scope: ScopeId, class: Option<&str>) {
        let Some(node) = self.index.node(id) else {
            return;
        };
        let range = node.range;

        match node.kind.clone() {
            NodeKind::Package { name } => {
                self.out.package = Some(name);
            }
            NodeKind::Import {
                path,
                alias,
                is_static,
                is_wildcard,
            } => {
                let info = ImportInfo {
                    path: path.clone(),
                    alias,
                    is_static,
                    is_wildcard,
                };
                let name = if is_wildcard {
                    path.clone()
                } else {
                    info.local_name().to_string()
                };
                let decl = self.declare(
                    id,
                    name.clone(),
                    DeclarationKind::Import,
                    range,
                    None,
                    Some(path),
                );
                if !is_wildcard {
                    self.out.tree.bind(scope, name, decl);
                }
                self.out.imports.push(info);
            }
            NodeKind::Class { name, .. } => {
                let container = match class {
                    Some(outer) => Some(outer.to_string()),
                    None => self.out.package.clone(),
                };
                let decl = self.declare(
                    id,
                    name.clone(),
                    DeclarationKind::Class,
                    range,
                    container,
                    None,
                );
                self.out.tree.bind(scope, name.clone(), decl);

                let type_scope = self
                    .out
                    .tree
                    .push_scope(ScopeKind::Type, id, range, Some(scope));
                self.out.tree.set_declaration(type_scope, decl);
                self.declare_members(id, type_scope, &name);
                self.visit_children(id, type_scope, Some(&name));
            }
            NodeKind::Method {
                name,
                return_type,
                parameters,
            } => {
                // Class methods were declared with their class; top-level
                // methods belong to the script module.
                if !self.out.by_node.contains_key(&id) {
                    let decl = self.declare(
                        id,
                        name.clone(),
                        DeclarationKind::Method,
                        range,
                        class.map(str::to_string),
                        return_type,
                    );
                    self.out
                        .tree
                        .add_member(scope, name, DeclarationKind::Method, decl);
                }
                let method_scope =
                    self.out
                        .tree
                        .push_scope(ScopeKind::Method, id, range, Some(scope));
                self.bind_parameters(id, method_scope, &parameters, class);
                self.visit_children(id, method_scope, class);
            }
            NodeKind::Field { name, type_name } => {
                if !self.out.by_node.contains_key(&id) {
                    let decl = self.declare(
                        id,
                        name.clone(),
                        DeclarationKind::Field,
                        range,
                        class.map(str::to_string),
                        type_name,
                    );
                    self.out.tree.bind(scope, name, decl);
                }
                self.visit_children(id, scope, class);
            }
            NodeKind::Variable { name, type_name } => {
                let decl = self.declare(
                    id,
                    name.clone(),
                    DeclarationKind::LocalVariable,
                    range,
                    class.map(str::to_string),
                    type_name,
                );
                self.out.tree.bind(scope, name, decl);
                self.visit_children(id, scope, class);
            }
            NodeKind::Block => {
                let block = self
                    .out
                    .tree
                    .push_scope(ScopeKind::Block, id, range, Some(scope));
                self.visit_children(id, block, class);
            }
            NodeKind::Loop { variable } => {
                let block = self
                    .out
                    .tree
                    .push_scope(ScopeKind::Block, id, range, Some(scope));
                if let Some(var) = variable {
                    let decl = self.declare_parameter(
                        id,
                        &var,
                        DeclarationKind::LocalVariable,
                        class,
                    );
                    self.out.tree.bind(block, var.name, decl);
                }
                self.visit_children(id, block, class);
            }
            NodeKind::Closure { parameters } => {
                let block = self
                    .out
                    .tree
                    .push_scope(ScopeKind::Block, id, range, Some(scope));
                self.bind_parameters(id, block, &parameters, class);
                self.visit_children(id, block, class);
            }
            NodeKind::Module
            | NodeKind::MethodCall { .. }
            | NodeKind::PropertyAccess { .. }
            | NodeKind::VariableRef { .. }
            | NodeKind::TypeRef { .. }
            | NodeKind::ConstructorCall { .. }
            | NodeKind::This
            | NodeKind::Expression => {
                self.visit_children(id, scope, class);
            }
        }
    }

    /// Fields and methods are visible throughout the class body, so they are
    /// registered before any member body is walked.
    fn declare_members(&mut self, class_node: NodeId, type_scope: ScopeId, class: &str) {
        let children = match self.index.node(class_node) {
            Some(n) => n.children.clone(),
            None => return,
        };
        for child in children {
            let Some(node) = self.index.node(child) else {
                continue;
            };
            let range = node.range;
            match node.kind.clone() {
                NodeKind::Field { name, type_name } => {
                    let decl = self.declare(
                        child,
                        name.clone(),
                        DeclarationKind::Field,
                        range,
                        Some(class.to_string()),
                        type_name,
                    );
                    self.out.tree.bind(type_scope, name.clone(), decl);
                    self.out
                        .tree
                        .add_member(type_scope, name, DeclarationKind::Field, decl);
                }
                NodeKind::Method {
                    name, return_type, ..
                } => {
                    let decl = self.declare(
                        child,
                        name.clone(),
                        DeclarationKind::Method,
                        range,
                        Some(class.to_string()),
                        return_type,
                    );
                    self.out
                        .tree
                        .add_member(type_scope, name, DeclarationKind::Method, decl);
                }
                _ => {}
            }
        }
    }

    fn bind_parameters(
        &mut self,
        owner: NodeId,
        scope: ScopeId,
        parameters: &[Parameter],
        class: Option<&str>,
    ) {
        for param in parameters {
            let decl = self.declare_parameter(owner, param, DeclarationKind::Parameter, class);
            self.out.tree.bind(scope, param.name.clone(), decl);
        }
    }

    fn declare_parameter(
        &mut self,
        owner: NodeId,
        param: &Parameter,
        kind: DeclarationKind,
        class: Option<&str>,
    ) -> DeclId {
        self.push_declaration(
            owner,
            param.name.clone(),
            kind,
            param.range,
            class.map(str::to_string),
            param.type_name.clone(),
        )
    }

    fn declare(
        &mut self,
        node: NodeId,
        name: String,
        kind: DeclarationKind,
        range: Range,
        container: Option<String>,
        type_name: Option<String>,
    ) -> DeclId {
        let id = self.push_declaration(node, name, kind, range, container, type_name);
        self.out.by_node.entry(node).or_insert(id);
        id
    }

    fn push_declaration(
        &mut self,
        node: NodeId,
        name: String,
        kind: DeclarationKind,
        range: Range,
        container: Option<String>,
        type_name: Option<String>,
    ) -> DeclId {
        let id = DeclId(self.out.declarations.len() as u32);
        self.out.declarations.push(Declaration {
            id,
            name,
            kind,
            document: self.index.document().clone(),
            node,
            range,
            container,
            type_name,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ResolutionKind;
    use groovyscope_api::{DocumentId, Position, SyntaxNode};

    fn class(name: &str, range: Range, children: Vec<SyntaxNode>) -> SyntaxNode {
        SyntaxNode::new(
            NodeKind::Class {
                name: name.into(),
                super_class: None,
                interfaces: vec![],
            },
            range,
        )
        .with_children(children)
    }

    fn build(root: &SyntaxNode) -> (DocumentIndex, DocumentSymbols) {
        let index = DocumentIndex::build(DocumentId::new("test.groovy"), root);
        let symbols = ScopeBuilder::new(&index).build();
        (index, symbols)
    }

    // package demo
    // import java.util.List as JList
    // class Foo {
    //     void run(int n) {
    //         String label = "a"
    //         for (item in items) { def label = item }
    //     }
    //     List items
    // }
    fn sample() -> SyntaxNode {
        let for_loop = SyntaxNode::new(
            NodeKind::Loop {
                variable: Some(Parameter::new("item", None, Range::new(5, 13, 5, 17))),
            },
            Range::new(5, 8, 5, 48),
        )
        .with_children([SyntaxNode::new(
            NodeKind::Variable {
                name: "label".into(),
                type_name: None,
            },
            Range::new(5, 30, 5, 46),
        )]);
        let method = SyntaxNode::new(
            NodeKind::Method {
                name: "run".into(),
                return_type: Some("void".into()),
                parameters: vec![Parameter::new("n", Some("int"), Range::new(3, 13, 3, 18))],
            },
            Range::new(3, 4, 6, 5),
        )
        .with_children([
            SyntaxNode::new(
                NodeKind::Variable {
                    name: "label".into(),
                    type_name: Some("String".into()),
                },
                Range::new(4, 8, 4, 26),
            ),
            for_loop,
        ]);
        let field = SyntaxNode::new(
            NodeKind::Field {
                name: "items".into(),
                type_name: Some("List".into()),
            },
            Range::new(7, 4, 7, 14),
        );
        SyntaxNode::new(NodeKind::Module, Range::new(0, 0, 9, 0)).with_children([
            SyntaxNode::new(
                NodeKind::Package {
                    name: "demo".into(),
                },
                Range::new(0, 0, 0, 12),
            ),
            SyntaxNode::new(
                NodeKind::Import {
                    path: "java.util.List".into(),
                    alias: Some("JList".into()),
                    is_static: false,
                    is_wildcard: false,
                },
                Range::new(1, 0, 1, 30),
            ),
            class("Foo", Range::new(2, 0, 8, 1), vec![method, field]),
        ])
    }

    #[test]
    fn test_declarations_and_package() {
        let (_, symbols) = build(&sample());
        assert_eq!(symbols.package.as_deref(), Some("demo"));
        assert_eq!(symbols.imports.len(), 1);
        assert_eq!(symbols.imports[0].local_name(), "JList");

        let names: Vec<_> = symbols
            .declarations
            .iter()
            .map(|d| (d.name.as_str(), d.kind))
            .collect();
        assert!(names.contains(&("Foo", DeclarationKind::Class)));
        assert!(names.contains(&("items", DeclarationKind::Field)));
        assert!(names.contains(&("run", DeclarationKind::Method)));
        assert!(names.contains(&("n", DeclarationKind::Parameter)));
        assert!(names.contains(&("item", DeclarationKind::LocalVariable)));
        assert!(names.contains(&("JList", DeclarationKind::Import)));

        let foo = symbols.classes().next().unwrap();
        assert_eq!(foo.qualified_name(), "demo.Foo");
        // Each declaring node maps to exactly one declaration.
        assert_eq!(
            symbols
                .declarations
                .iter()
                .filter(|d| d.name == "run")
                .count(),
            1
        );
    }

    #[test]
    fn test_field_declared_after_method_is_visible() {
        let (_, symbols) = build(&sample());
        let method_scope = symbols.tree.scope_at(Position::new(4, 10)).unwrap();
        let found = symbols.tree.resolve_symbol("items", method_scope).unwrap();
        assert_eq!(found.kind, ResolutionKind::Local);
        let decl = symbols.declaration(found.decl).unwrap();
        assert_eq!(decl.kind, DeclarationKind::Field);
    }

    #[test]
    fn test_loop_scope_shadows_method_local() {
        let (_, symbols) = build(&sample());
        let loop_scope = symbols.tree.scope_at(Position::new(5, 40)).unwrap();
        assert_eq!(
            symbols.tree.scope(loop_scope).unwrap().kind,
            ScopeKind::Block
        );
        let inner = symbols.tree.resolve_symbol("label", loop_scope).unwrap();
        assert_eq!(
            symbols.declaration(inner.decl).unwrap().range,
            Range::new(5, 30, 5, 46)
        );

        let method_scope = symbols.tree.scope_at(Position::new(4, 10)).unwrap();
        let outer = symbols.tree.resolve_symbol("label", method_scope).unwrap();
        assert_eq!(
            symbols.declaration(outer.decl).unwrap().type_name.as_deref(),
            Some("String")
        );
        let item = symbols.tree.resolve_symbol("item", loop_scope).unwrap();
        assert_eq!(
            symbols.declaration(item.decl).unwrap().kind,
            DeclarationKind::LocalVariable
        );
    }

    #[test]
    fn test_method_found_as_member() {
        let (_, symbols) = build(&sample());
        let scope = symbols.tree.scope_at(Position::new(4, 10)).unwrap();
        let found = symbols.tree.resolve_symbol("run", scope).unwrap();
        assert_eq!(found.kind, ResolutionKind::Member);
        let alias = symbols.tree.resolve_symbol("JList", scope).unwrap();
        assert_eq!(
            symbols.declaration(alias.decl).unwrap().type_name.as_deref(),
            Some("java.util.List")
        );
    }
}
