//! Tree builders and fixtures shared by the integration suites.

use groovyscope_api::{DocumentId, NodeKind, Parameter, Range, SyntaxNode, SyntaxTree};
use groovyscope_core::external::SourceParser;
use groovyscope_core::{Engine, EngineConfig};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub fn r(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Range {
    Range::new(start_line, start_col, end_line, end_col)
}

pub fn doc(uri: &str) -> DocumentId {
    DocumentId::new(uri)
}

#[allow(dead_code)]
pub fn module(range: Range, children: Vec<SyntaxNode>) -> SyntaxNode {
    SyntaxNode::new(NodeKind::Module, range).with_children(children)
}

#[allow(dead_code)]
pub fn package(name: &str, range: Range) -> SyntaxNode {
    SyntaxNode::new(NodeKind::Package { name: name.into() }, range)
}

#[allow(dead_code)]
pub fn import(path: &str, range: Range) -> SyntaxNode {
    SyntaxNode::new(
        NodeKind::Import {
            path: path.into(),
            alias: None,
            is_static: false,
            is_wildcard: path.ends_with(".*"),
        },
        range,
    )
}

#[allow(dead_code)]
pub fn class(
    name: &str,
    super_class: Option<&str>,
    range: Range,
    children: Vec<SyntaxNode>,
) -> SyntaxNode {
    SyntaxNode::new(
        NodeKind::Class {
            name: name.into(),
            super_class: super_class.map(str::to_string),
            interfaces: vec![],
        },
        range,
    )
    .with_children(children)
}

#[allow(dead_code)]
pub fn method(
    name: &str,
    return_type: Option<&str>,
    parameters: Vec<Parameter>,
    range: Range,
    body: Vec<SyntaxNode>,
) -> SyntaxNode {
    SyntaxNode::new(
        NodeKind::Method {
            name: name.into(),
            return_type: return_type.map(str::to_string),
            parameters,
        },
        range,
    )
    .with_children(body)
}

#[allow(dead_code)]
pub fn param(name: &str, type_name: Option<&str>, range: Range) -> Parameter {
    Parameter::new(name, type_name, range)
}

#[allow(dead_code)]
pub fn field(name: &str, type_name: Option<&str>, range: Range) -> SyntaxNode {
    SyntaxNode::new(
        NodeKind::Field {
            name: name.into(),
            type_name: type_name.map(str::to_string),
        },
        range,
    )
}

#[allow(dead_code)]
pub fn var(name: &str, type_name: Option<&str>, range: Range, init: Vec<SyntaxNode>) -> SyntaxNode {
    SyntaxNode::new(
        NodeKind::Variable {
            name: name.into(),
            type_name: type_name.map(str::to_string),
        },
        range,
    )
    .with_children(init)
}

/// `name(...)` without a receiver.
#[allow(dead_code)]
pub fn call(name: &str, range: Range) -> SyntaxNode {
    SyntaxNode::new(
        NodeKind::MethodCall {
            name: name.into(),
            has_receiver: false,
        },
        range,
    )
}

/// `receiver.name(...)`
#[allow(dead_code)]
pub fn call_on(receiver: SyntaxNode, name: &str, range: Range) -> SyntaxNode {
    SyntaxNode::new(
        NodeKind::MethodCall {
            name: name.into(),
            has_receiver: true,
        },
        range,
    )
    .with_children([receiver])
}

#[allow(dead_code)]
pub fn prop(receiver: SyntaxNode, name: &str, range: Range) -> SyntaxNode {
    SyntaxNode::new(NodeKind::PropertyAccess { name: name.into() }, range).with_children([receiver])
}

#[allow(dead_code)]
pub fn var_ref(name: &str, range: Range) -> SyntaxNode {
    SyntaxNode::new(NodeKind::VariableRef { name: name.into() }, range)
}

#[allow(dead_code)]
pub fn type_ref(name: &str, range: Range) -> SyntaxNode {
    SyntaxNode::new(NodeKind::TypeRef { name: name.into() }, range)
}

#[allow(dead_code)]
pub fn new_instance(type_name: &str, range: Range) -> SyntaxNode {
    SyntaxNode::new(
        NodeKind::ConstructorCall {
            type_name: type_name.into(),
        },
        range,
    )
}

#[allow(dead_code)]
pub fn this(range: Range) -> SyntaxNode {
    SyntaxNode::new(NodeKind::This, range)
}

#[allow(dead_code)]
pub fn tree(root: SyntaxNode) -> SyntaxTree {
    SyntaxTree::new(root)
}

/// Parser stand-in: the "source" is the tree as JSON.
#[allow(dead_code)]
pub struct JsonTreeParser;

impl SourceParser for JsonTreeParser {
    fn parse(&self, _document: &DocumentId, text: &str) -> groovyscope_core::Result<SyntaxTree> {
        Ok(serde_json::from_str(text)?)
    }
}

#[allow(dead_code)]
pub fn test_config(dir: &TempDir) -> EngineConfig {
    let mut config = EngineConfig::default().with_cache_dir(dir.path().join("cache"));
    config.eager_classpath_indexing = false;
    config
}

#[allow(dead_code)]
pub fn test_engine(dir: &TempDir) -> Engine {
    Engine::builder(test_config(dir))
        .with_parser(Arc::new(JsonTreeParser))
        .build()
}

#[allow(dead_code)]
pub fn write_jar(path: &Path, entries: &[(&str, &str)]) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, body) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
    path.to_path_buf()
}
