use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

use crate::error::{ApiError, ApiResult};

/// A 0-indexed `(line, character)` pair.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }

    /// Build a position from editor input, rejecting negative coordinates.
    pub fn checked(line: i64, character: i64) -> ApiResult<Self> {
        let line = u32::try_from(line)
            .map_err(|_| ApiError::InvalidArgument(format!("line out of range: {line}")))?;
        let character = u32::try_from(character).map_err(|_| {
            ApiError::InvalidArgument(format!("character out of range: {character}"))
        })?;
        Ok(Self { line, character })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
pub struct Range {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Range {
    pub const fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    pub fn start(&self) -> Position {
        Position::new(self.start_line, self.start_col)
    }

    pub fn end(&self) -> Position {
        Position::new(self.end_line, self.end_col)
    }

    pub fn contains(&self, pos: Position) -> bool {
        let (line, col) = (pos.line, pos.character);
        if line < self.start_line || line > self.end_line {
            return false;
        }
        if line == self.start_line && col < self.start_col {
            return false;
        }
        if line == self.end_line && col > self.end_col {
            return false;
        }
        true
    }

    pub fn contains_range(&self, other: &Range) -> bool {
        self.contains(other.start()) && self.contains(other.end())
    }
}

/// Identity of a document (usually its URI).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
#[serde(transparent)]
pub struct DocumentId(#[schemars(with = "String")] SmolStr);

impl DocumentId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(SmolStr::new(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable index of a node inside its document's arena.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a declaration in its document's declaration list.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclId(pub u32);

impl DeclId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Class,
    Method,
    Field,
    Parameter,
    LocalVariable,
    Import,
}

impl DeclarationKind {
    pub fn is_member(self) -> bool {
        matches!(self, DeclarationKind::Method | DeclarationKind::Field)
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Method => "method",
            DeclarationKind::Field => "field",
            DeclarationKind::Parameter => "parameter",
            DeclarationKind::LocalVariable => "local",
            DeclarationKind::Import => "import",
        };
        f.write_str(s)
    }
}

/// A named binding introduced by source code.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub id: DeclId,
    pub name: String,
    pub kind: DeclarationKind,
    pub document: DocumentId,
    /// Node that introduced the binding (the method node for its parameters).
    pub node: NodeId,
    pub range: Range,
    /// Package for classes, simple name of the declaring class for members.
    pub container: Option<String>,
    /// Declared (static) type; the imported path for imports.
    pub type_name: Option<String>,
}

impl Declaration {
    /// Fully-qualified name for classes, `name` otherwise.
    pub fn qualified_name(&self) -> String {
        match (self.kind, &self.container) {
            (DeclarationKind::Class, Some(pkg)) if !pkg.is_empty() => {
                format!("{pkg}.{}", self.name)
            }
            _ => self.name.clone(),
        }
    }
}

/// Last segment of a dotted name, with generic arguments stripped.
pub fn simple_name(name: &str) -> &str {
    let base = name.split('<').next().unwrap_or(name).trim();
    let base = base.trim_end_matches("[]");
    base.rsplit('.').next().unwrap_or(base)
}

/// Package part of a dotted name, if any.
pub fn package_of(name: &str) -> Option<&str> {
    name.rfind('.').map(|idx| &name[..idx])
}
