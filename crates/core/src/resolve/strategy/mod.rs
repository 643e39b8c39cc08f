//! Default strategies, in pipeline order.

mod classpath;
mod external;
mod global;
mod local;

pub use classpath::ClasspathStrategy;
pub use external::NamedExternalStrategy;
pub use global::GlobalClassStrategy;
pub use local::LocalStrategy;

use super::ResolutionContext;
use groovyscope_api::{DeclarationKind, NodeKind, package_of};

/// Type named by the target node, if the node refers to a type at all.
///
/// Imports yield their path; a static import yields its owning class. A
/// variable reference counts only when it is bound to an import or is an
/// unbound capitalized name.
pub(crate) fn referenced_type(ctx: &ResolutionContext) -> Option<String> {
    let node = ctx.node()?;
    match &node.kind {
        NodeKind::TypeRef { name } => Some(name.clone()),
        NodeKind::ConstructorCall { type_name } => Some(type_name.clone()),
        NodeKind::Import {
            path,
            is_static,
            is_wildcard,
            ..
        } => {
            let path = path.strip_suffix(".*").unwrap_or(path);
            match (*is_static, *is_wildcard) {
                (false, false) => Some(path.to_string()),
                (true, false) => package_of(path).map(str::to_string),
                (true, true) => Some(path.to_string()),
                (false, true) => None,
            }
        }
        NodeKind::VariableRef { name } => {
            let snapshot = &ctx.document;
            let binding = snapshot
                .symbols
                .scope_of(&snapshot.index, node.id)
                .and_then(|scope| snapshot.symbols.tree.resolve_symbol(name, scope))
                .and_then(|b| snapshot.symbols.declaration(b.decl));
            match binding {
                Some(decl) if decl.kind == DeclarationKind::Import => decl.type_name.clone(),
                Some(decl) if decl.kind == DeclarationKind::Class => Some(decl.name.clone()),
                Some(_) => None,
                None => name
                    .starts_with(|c: char| c.is_ascii_uppercase())
                    .then(|| name.clone()),
            }
        }
        _ => None,
    }
}
