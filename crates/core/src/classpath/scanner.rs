//! Reading class names out of classpath entries.

use crate::error::{GroovyscopeError, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::ZipArchive;

/// One class found on the classpath.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClasspathEntry {
    pub simple_name: String,
    pub fqn: String,
    /// Archive (or class directory) the class was read from.
    pub archive: PathBuf,
}

impl ClasspathEntry {
    pub fn new(fqn: impl Into<String>, archive: impl Into<PathBuf>) -> Self {
        let fqn = fqn.into();
        let simple_name = fqn.rsplit('.').next().unwrap_or(&fqn).to_string();
        Self {
            simple_name,
            fqn,
            archive: archive.into(),
        }
    }

    /// `com.acme.Widget` -> `com/acme/Widget.class`
    pub fn class_file_path(&self) -> String {
        format!("{}.class", self.fqn.replace('.', "/"))
    }
}

pub trait ClasspathScanner: Send + Sync {
    fn can_scan(&self, path: &Path) -> bool;

    fn scan(&self, path: &Path) -> Result<Vec<ClasspathEntry>>;
}

/// Scans `.jar`/`.zip` archives and exploded class directories.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveScanner;

impl ArchiveScanner {
    fn scan_zip(path: &Path) -> Result<Vec<ClasspathEntry>> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file).map_err(|e| {
            GroovyscopeError::Classpath(format!("cannot open {}: {}", path.display(), e))
        })?;

        let mut entries = Vec::new();
        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            if let Some(fqn) = class_name_of(entry.name()) {
                entries.push(ClasspathEntry::new(fqn, path));
            }
        }
        Ok(entries)
    }

    fn scan_directory(path: &Path) -> Vec<ClasspathEntry> {
        WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let relative = e.path().strip_prefix(path).ok()?;
                let name = relative.to_string_lossy().replace('\\', "/");
                class_name_of(&name).map(|fqn| ClasspathEntry::new(fqn, path))
            })
            .collect()
    }
}

impl ClasspathScanner for ArchiveScanner {
    fn can_scan(&self, path: &Path) -> bool {
        if path.is_dir() {
            return true;
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        ext == "jar" || ext == "zip"
    }

    fn scan(&self, path: &Path) -> Result<Vec<ClasspathEntry>> {
        if !path.exists() {
            tracing::debug!("Classpath entry {} does not exist", path.display());
            return Ok(Vec::new());
        }
        if path.is_dir() {
            Ok(Self::scan_directory(path))
        } else {
            Self::scan_zip(path)
        }
    }
}

/// Top-level class name for an archive entry, if it names one.
pub fn class_name_of(entry: &str) -> Option<String> {
    let stem = entry.strip_suffix(".class")?;
    if stem.starts_with("META-INF/") || stem.contains('$') {
        return None;
    }
    let file = stem.rsplit('/').next().unwrap_or(stem);
    if file == "module-info" || file == "package-info" || file.is_empty() {
        return None;
    }
    Some(stem.replace('/', "."))
}
