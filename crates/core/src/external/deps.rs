//! Classpath providers.

use crate::error::Result;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Supplies the current set of classpath entries.
pub trait DependencyResolver: Send + Sync {
    fn resolve(&self) -> Result<Vec<PathBuf>>;
}

/// A fixed list of entries.
#[derive(Debug, Clone, Default)]
pub struct StaticClasspath(pub Vec<PathBuf>);

impl DependencyResolver for StaticClasspath {
    fn resolve(&self) -> Result<Vec<PathBuf>> {
        Ok(self.0.clone())
    }
}

/// Every `.jar` below a directory, in path order. `-sources.jar` files are
/// left to the source extractor.
#[derive(Debug, Clone)]
pub struct LibDirectoryResolver {
    dir: PathBuf,
}

impl LibDirectoryResolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DependencyResolver for LibDirectoryResolver {
    fn resolve(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut jars = Vec::new();
        for entry in WalkDir::new(&self.dir).sort_by_file_name() {
            let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
            let path = entry.path();
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if entry.file_type().is_file()
                && name.ends_with(".jar")
                && !name.ends_with("-sources.jar")
            {
                jars.push(path.to_path_buf());
            }
        }
        Ok(jars)
    }
}
