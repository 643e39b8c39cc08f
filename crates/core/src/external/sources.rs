//! Source attachment for classpath classes.

use crate::cache::ContentCache;
use crate::classpath::ClasspathEntry;
use crate::error::Result;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use zip::ZipArchive;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Source { path: PathBuf, line: Option<u32> },
    BinaryOnly { reason: String },
}

pub trait SourceExtractor: Send + Sync {
    /// Blocking; callers run it off the async executor.
    fn extract(&self, entry: &ClasspathEntry) -> Extraction;
}

/// Looks for a `-sources.jar` next to the binary archive and materializes the
/// class's source file through the content cache.
pub struct SourcesJarExtractor {
    cache: Arc<ContentCache>,
}

impl SourcesJarExtractor {
    pub fn new(cache: Arc<ContentCache>) -> Self {
        Self { cache }
    }

    fn try_extract(&self, entry: &ClasspathEntry) -> Result<Extraction> {
        let Some(sources) = locate_sources_jar(&entry.archive) else {
            return Ok(Extraction::BinaryOnly {
                reason: format!("no sources archive for {}", entry.archive.display()),
            });
        };

        let mut archive = ZipArchive::new(File::open(&sources)?)?;
        let base = entry.fqn.replace('.', "/");
        for ext in ["groovy", "java"] {
            let name = format!("{base}.{ext}");
            let Ok(mut file) = archive.by_name(&name) else {
                continue;
            };
            let mut text = String::new();
            file.read_to_string(&mut text)?;
            let path = self.cache.get_or_create(text.as_bytes(), ext)?;
            return Ok(Extraction::Source {
                line: declaration_line(&text, &entry.simple_name),
                path,
            });
        }

        Ok(Extraction::BinaryOnly {
            reason: format!("{} not found in {}", base, sources.display()),
        })
    }
}

impl SourceExtractor for SourcesJarExtractor {
    fn extract(&self, entry: &ClasspathEntry) -> Extraction {
        match self.try_extract(entry) {
            Ok(extraction) => extraction,
            Err(e) => {
                tracing::warn!("Source extraction for {} failed: {}", entry.fqn, e);
                Extraction::BinaryOnly {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// `foo-1.0.jar` -> `foo-1.0-sources.jar`, either beside it or in a sibling
/// hash directory (Gradle's `files-2.1/<g>/<a>/<v>/<hash>/` layout).
pub fn locate_sources_jar(archive: &Path) -> Option<PathBuf> {
    let file_name = archive.file_name()?.to_str()?;
    let stem = file_name.strip_suffix(".jar")?;
    if stem.ends_with("-sources") {
        return None;
    }
    let source_name = format!("{stem}-sources.jar");

    let beside = archive.with_file_name(&source_name);
    if beside.is_file() {
        return Some(beside);
    }

    let version_dir = archive.parent()?.parent()?;
    std::fs::read_dir(version_dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path().join(&source_name))
        .find(|p| p.is_file())
}

/// 0-indexed line declaring type `name`, if it can be found textually.
pub fn declaration_line(text: &str, name: &str) -> Option<u32> {
    const KEYWORDS: [&str; 5] = ["class", "interface", "enum", "trait", "record"];
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';
    text.lines()
        .position(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            tokens.windows(2).any(|pair| {
                let keyword = pair[0].trim_start_matches('@');
                KEYWORDS.contains(&keyword)
                    && pair[1]
                        .strip_prefix(name)
                        .is_some_and(|rest| !rest.starts_with(is_ident))
            })
        })
        .map(|idx| idx as u32)
}
