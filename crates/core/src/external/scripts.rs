//! Named script units.
//!
//! Shared libraries expose global steps as `vars/<name>.groovy`; a bare call
//! `name(...)` in a pipeline script refers to that file.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub trait ScriptRegistry: Send + Sync {
    /// Path of the script unit called `name`, if one exists.
    fn lookup(&self, name: &str) -> Option<PathBuf>;

    fn names(&self) -> Vec<String>;
}

/// Registry over `vars/` directories of one or more library roots.
pub struct VarsDirectoryRegistry {
    roots: Vec<PathBuf>,
    entries: RwLock<BTreeMap<String, PathBuf>>,
}

impl VarsDirectoryRegistry {
    /// Scans the roots immediately.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        let registry = Self {
            roots,
            entries: RwLock::new(BTreeMap::new()),
        };
        registry.refresh();
        registry
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Rescan every root. When two roots define the same name the first root
    /// wins.
    pub fn refresh(&self) -> usize {
        let mut entries = BTreeMap::new();
        for root in &self.roots {
            for (name, path) in scan_root(root) {
                entries.entry(name).or_insert(path);
            }
        }
        let count = entries.len();
        *self.entries.write() = entries;
        tracing::debug!("Script registry refreshed: {} units", count);
        count
    }
}

impl ScriptRegistry for VarsDirectoryRegistry {
    fn lookup(&self, name: &str) -> Option<PathBuf> {
        self.entries.read().get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

fn scan_root(root: &Path) -> Vec<(String, PathBuf)> {
    let vars = root.join("vars");
    if !vars.is_dir() {
        return Vec::new();
    }
    WalkDir::new(&vars)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let path = e.into_path();
            if path.extension().and_then(|x| x.to_str()) != Some("groovy") {
                return None;
            }
            let name = path.file_stem()?.to_str()?.to_string();
            Some((name, path))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn library(dir: &Path, scripts: &[&str]) {
        let vars = dir.join("vars");
        std::fs::create_dir_all(&vars).unwrap();
        for s in scripts {
            std::fs::write(vars.join(s), "def call() {}").unwrap();
        }
    }

    #[test]
    fn test_lookup_by_bare_name() {
        let dir = TempDir::new().unwrap();
        library(dir.path(), &["deployApp.groovy", "notes.txt"]);

        let registry = VarsDirectoryRegistry::new(vec![dir.path().to_path_buf()]);
        assert_eq!(
            registry.lookup("deployApp"),
            Some(dir.path().join("vars/deployApp.groovy"))
        );
        assert_eq!(registry.lookup("notes"), None);
        assert_eq!(registry.names(), vec!["deployApp".to_string()]);
    }

    #[test]
    fn test_first_root_wins_and_refresh_picks_up_new_files() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        library(first.path(), &["build.groovy"]);
        library(second.path(), &["build.groovy"]);

        let registry = VarsDirectoryRegistry::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        assert!(registry.lookup("build").unwrap().starts_with(first.path()));

        library(second.path(), &["release.groovy"]);
        assert_eq!(registry.lookup("release"), None);
        assert_eq!(registry.refresh(), 2);
        assert!(registry.lookup("release").is_some());
    }
}
