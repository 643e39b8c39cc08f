//! Syntax tree handed over by the parser collaborator.
//!
//! The tree is a closed set of node kinds; every consumer matches on
//! [`NodeKind`] exhaustively.

use super::symbol::Range;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub type_name: Option<String>,
    pub range: Range,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_name: Option<&str>, range: Range) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.map(str::to_string),
            range,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Module,
    Package {
        name: String,
    },
    Import {
        path: String,
        alias: Option<String>,
        is_static: bool,
        is_wildcard: bool,
    },
    Class {
        name: String,
        super_class: Option<String>,
        interfaces: Vec<String>,
    },
    /// Method statements are direct children; a nested `Block` child is an
    /// explicit block inside the body.
    Method {
        name: String,
        return_type: Option<String>,
        parameters: Vec<Parameter>,
    },
    Field {
        name: String,
        type_name: Option<String>,
    },
    /// Local variable declaration statement.
    Variable {
        name: String,
        type_name: Option<String>,
    },
    Block,
    Loop {
        variable: Option<Parameter>,
    },
    Closure {
        parameters: Vec<Parameter>,
    },
    /// With a receiver, the receiver expression is the first child.
    MethodCall {
        name: String,
        has_receiver: bool,
    },
    /// The receiver expression is the first child.
    PropertyAccess {
        name: String,
    },
    VariableRef {
        name: String,
    },
    TypeRef {
        name: String,
    },
    ConstructorCall {
        type_name: String,
    },
    This,
    Expression,
}

impl NodeKind {
    pub fn name(&self) -> Option<&str> {
        match self {
            NodeKind::Package { name }
            | NodeKind::Class { name, .. }
            | NodeKind::Method { name, .. }
            | NodeKind::Field { name, .. }
            | NodeKind::Variable { name, .. }
            | NodeKind::MethodCall { name, .. }
            | NodeKind::PropertyAccess { name }
            | NodeKind::VariableRef { name }
            | NodeKind::TypeRef { name } => Some(name),
            NodeKind::Import { path, .. } => Some(path),
            NodeKind::ConstructorCall { type_name } => Some(type_name),
            NodeKind::Module
            | NodeKind::Block
            | NodeKind::Loop { .. }
            | NodeKind::Closure { .. }
            | NodeKind::This
            | NodeKind::Expression => None,
        }
    }

    pub fn is_type_declaration(&self) -> bool {
        matches!(self, NodeKind::Class { .. })
    }

    /// Type, method and block-level constructs that enclose other nodes.
    pub fn is_container(&self) -> bool {
        match self {
            NodeKind::Module
            | NodeKind::Class { .. }
            | NodeKind::Method { .. }
            | NodeKind::Block
            | NodeKind::Loop { .. }
            | NodeKind::Closure { .. } => true,
            NodeKind::Package { .. }
            | NodeKind::Import { .. }
            | NodeKind::Field { .. }
            | NodeKind::Variable { .. }
            | NodeKind::MethodCall { .. }
            | NodeKind::PropertyAccess { .. }
            | NodeKind::VariableRef { .. }
            | NodeKind::TypeRef { .. }
            | NodeKind::ConstructorCall { .. }
            | NodeKind::This
            | NodeKind::Expression => false,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Module => "module",
            NodeKind::Package { .. } => "package",
            NodeKind::Import { .. } => "import",
            NodeKind::Class { .. } => "class",
            NodeKind::Method { .. } => "method",
            NodeKind::Field { .. } => "field",
            NodeKind::Variable { .. } => "variable",
            NodeKind::Block => "block",
            NodeKind::Loop { .. } => "loop",
            NodeKind::Closure { .. } => "closure",
            NodeKind::MethodCall { .. } => "call",
            NodeKind::PropertyAccess { .. } => "property",
            NodeKind::VariableRef { .. } => "variable_ref",
            NodeKind::TypeRef { .. } => "type_ref",
            NodeKind::ConstructorCall { .. } => "new",
            NodeKind::This => "this",
            NodeKind::Expression => "expression",
        }
    }
}

/// A node as produced by the parser: owned, with its children inline.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub range: Range,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, range: Range) -> Self {
        Self {
            kind,
            range,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = SyntaxNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn push(&mut self, child: SyntaxNode) {
        self.children.push(child);
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: Severity,
    pub message: String,
}

/// Parser output for one document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    pub root: SyntaxNode,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl SyntaxTree {
    pub fn new(root: SyntaxNode) -> Self {
        Self {
            root,
            diagnostics: Vec::new(),
        }
    }
}
