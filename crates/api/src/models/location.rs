use super::symbol::{Declaration, DeclarationKind, DocumentId, Range};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LocationTarget {
    /// A document loaded in the workspace.
    Document { id: DocumentId },
    /// A file on disk outside the workspace (named script, extracted source).
    File { path: PathBuf },
    /// A class inside a dependency archive with no source attached.
    Archive { uri: String },
}

/// Where a resolved declaration lives.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct DefinitionLocation {
    pub target: LocationTarget,
    pub range: Range,
    pub name: String,
    pub kind: DeclarationKind,
}

impl DefinitionLocation {
    pub fn from_declaration(decl: &Declaration) -> Self {
        Self {
            target: LocationTarget::Document {
                id: decl.document.clone(),
            },
            range: decl.range,
            name: decl.name.clone(),
            kind: decl.kind,
        }
    }

    pub fn file(path: PathBuf, line: u32, name: impl Into<String>, kind: DeclarationKind) -> Self {
        Self {
            target: LocationTarget::File { path },
            range: Range::new(line, 0, line, 0),
            name: name.into(),
            kind,
        }
    }

    pub fn document(&self) -> Option<&DocumentId> {
        match &self.target {
            LocationTarget::Document { id } => Some(id),
            _ => None,
        }
    }
}
