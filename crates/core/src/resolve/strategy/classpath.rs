use super::referenced_type;
use crate::classpath::{ClasspathEntry, ClasspathIndex};
use crate::engine::Workspace;
use crate::external::{Extraction, SourceExtractor};
use crate::resolve::target::{TargetResolver, WorkspaceLookup, qualify};
use crate::resolve::{ResolutionContext, ResolutionResult, ResolutionStrategy, StrategyFault};
use crate::scope::DocumentSymbols;
use async_trait::async_trait;
use groovyscope_api::{DeclarationKind, DefinitionLocation, LocationTarget, NodeKind, Range};
use std::sync::Arc;

/// Packages every Groovy source sees without importing them.
const DEFAULT_PACKAGES: [&str; 6] = [
    "java.lang",
    "java.util",
    "java.io",
    "java.net",
    "groovy.lang",
    "groovy.util",
];

const DEFAULT_CLASSES: [&str; 2] = ["java.math.BigDecimal", "java.math.BigInteger"];

/// Classes from compiled dependencies.
pub struct ClasspathStrategy {
    classpath: Arc<ClasspathIndex>,
    extractor: Arc<dyn SourceExtractor>,
    workspace: Arc<Workspace>,
    archive_uris: bool,
    max_depth: usize,
}

impl ClasspathStrategy {
    pub const NAME: &'static str = "classpath";

    pub fn new(
        classpath: Arc<ClasspathIndex>,
        extractor: Arc<dyn SourceExtractor>,
        workspace: Arc<Workspace>,
        archive_uris: bool,
        max_depth: usize,
    ) -> Self {
        Self {
            classpath,
            extractor,
            workspace,
            archive_uris,
            max_depth,
        }
    }

    /// Type the target refers to; for member references, the receiver's type.
    fn target_type(&self, ctx: &ResolutionContext) -> Result<Option<String>, StrategyFault> {
        let Some(node) = ctx.node() else {
            return Ok(None);
        };
        match &node.kind {
            NodeKind::MethodCall {
                has_receiver: true, ..
            }
            | NodeKind::PropertyAccess { .. } => {
                let Some(receiver) = ctx.document.index.first_child(node.id) else {
                    return Ok(None);
                };
                let lookup = WorkspaceLookup::new(&self.workspace, &ctx.document);
                let resolver = TargetResolver::new(&lookup, self.max_depth);
                let mut trail = Vec::new();
                resolver.expression_type(&ctx.document, receiver.id, 0, &mut trail)
            }
            _ => Ok(referenced_type(ctx)),
        }
    }

    fn render(&self, entry: &ClasspathEntry, extraction: Extraction) -> ResolutionResult {
        match extraction {
            Extraction::Source { path, line } => ResolutionResult::Found(DefinitionLocation::file(
                path,
                line.unwrap_or(0),
                entry.simple_name.clone(),
                DeclarationKind::Class,
            )),
            Extraction::BinaryOnly { reason } if self.archive_uris => {
                tracing::debug!(
                    "{} has no source ({}), using archive reference",
                    entry.fqn,
                    reason
                );
                ResolutionResult::Found(DefinitionLocation {
                    target: LocationTarget::Archive {
                        uri: archive_uri(entry),
                    },
                    range: Range::new(0, 0, 0, 0),
                    name: entry.simple_name.clone(),
                    kind: DeclarationKind::Class,
                })
            }
            Extraction::BinaryOnly { reason } => ResolutionResult::not_found(
                format!("{} is binary only ({reason})", entry.fqn),
                Self::NAME,
            ),
        }
    }
}

/// `jar:file://<archive>!/<package path>/<Name>.class`
pub fn archive_uri(entry: &ClasspathEntry) -> String {
    format!(
        "jar:file://{}!/{}",
        entry.archive.display(),
        entry.class_file_path()
    )
}

/// FQNs `name` may denote from this document, most likely first.
pub fn candidate_fqns(symbols: &DocumentSymbols, name: &str) -> Vec<String> {
    let wanted = qualify(symbols, name);
    if let Some(fqn) = wanted.fqn {
        return vec![fqn];
    }
    let simple = wanted.simple;
    let mut out: Vec<String> = Vec::new();
    let mut push = |fqn: String| {
        if !out.contains(&fqn) {
            out.push(fqn);
        }
    };

    for import in &symbols.imports {
        if let Some(pkg) = import.wildcard_package() {
            push(format!("{pkg}.{simple}"));
        }
    }
    match &symbols.package {
        Some(pkg) => push(format!("{pkg}.{simple}")),
        None => push(simple.clone()),
    }
    for pkg in DEFAULT_PACKAGES {
        push(format!("{pkg}.{simple}"));
    }
    for class in DEFAULT_CLASSES {
        if class.rsplit('.').next() == Some(simple.as_str()) {
            push(class.to_string());
        }
    }
    out
}

#[async_trait]
impl ResolutionStrategy for ClasspathStrategy {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn resolve(&self, ctx: &ResolutionContext) -> Result<ResolutionResult, StrategyFault> {
        let Some(type_name) = self.target_type(ctx)? else {
            return Ok(ResolutionResult::not_found("no type to look up", Self::NAME));
        };
        let candidates = candidate_fqns(&ctx.document.symbols, &type_name);
        let pinned = qualify(&ctx.document.symbols, &type_name);

        // Waiting here never cancels the scan itself, only this request.
        let index = tokio::select! {
            _ = ctx.cancel.cancelled() => {
                return Ok(ResolutionResult::not_found("cancelled", Self::NAME));
            }
            index = self.classpath.index_all() => index,
        };
        let index = match index {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!("Classpath unavailable for {}: {}", type_name, e);
                return Ok(ResolutionResult::not_found(
                    format!("classpath unavailable: {e}"),
                    Self::NAME,
                ));
            }
        };

        let entry = candidates
            .iter()
            .find_map(|fqn| index.entry(fqn))
            .or_else(|| {
                // Not reachable through imports; any class of that name, by FQN.
                if pinned.fqn.is_some() {
                    return None;
                }
                index
                    .classes_for_simple_name(&pinned.simple)
                    .first()
                    .and_then(|fqn| index.entry(fqn))
            })
            .cloned();
        let Some(entry) = entry else {
            return Ok(ResolutionResult::not_found(
                format!("`{type_name}` not on classpath"),
                Self::NAME,
            ));
        };

        let extractor = self.extractor.clone();
        let job_entry = entry.clone();
        let extraction = tokio::select! {
            _ = ctx.cancel.cancelled() => {
                return Ok(ResolutionResult::not_found("cancelled", Self::NAME));
            }
            res = tokio::task::spawn_blocking(move || extractor.extract(&job_entry)) => res,
        };
        let extraction = extraction.map_err(|e| StrategyFault::Other(e.to_string()))?;
        Ok(self.render(&entry, extraction))
    }
}
