//! Content-addressed artifact cache.
//!
//! Artifacts are stored under the SHA-256 of their content, so any two writers
//! of the same bytes produce interchangeable files.

use crate::error::{GroovyscopeError, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone)]
pub struct ContentCache {
    root: PathBuf,
}

impl ContentCache {
    /// The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Final path for `content` with the given file extension (without dot).
    pub fn path_for(&self, content: &[u8], extension: &str) -> PathBuf {
        let name = sha256_hex(content);
        if extension.is_empty() {
            self.root.join(name)
        } else {
            self.root.join(format!("{name}.{extension}"))
        }
    }

    pub fn contains(&self, content: &[u8], extension: &str) -> bool {
        self.path_for(content, extension).is_file()
    }

    /// Return the cached artifact for `content`, publishing it first if no
    /// writer has done so yet.
    pub fn get_or_create(&self, content: &[u8], extension: &str) -> Result<PathBuf> {
        let target = self.path_for(content, extension);
        if target.is_file() {
            return Ok(target);
        }

        fs::create_dir_all(&self.root)?;
        let mut temp = NamedTempFile::new_in(&self.root)?;
        temp.write_all(content)?;
        temp.as_file().sync_all()?;

        // The temp file is deleted when `temp` (or the error holding it) drops.
        match temp.persist_noclobber(&target) {
            Ok(_) => {
                tracing::debug!("Published cache artifact {}", target.display());
                Ok(target)
            }
            Err(err) if err.error.kind() == ErrorKind::AlreadyExists => Ok(target),
            // Some platforms report a lost race differently; the hash-keyed
            // file is what matters.
            Err(_) if target.is_file() => Ok(target),
            Err(err) => Err(GroovyscopeError::Cache(format!(
                "failed to publish {}: {}",
                target.display(),
                err.error
            ))),
        }
    }

    /// Remove every artifact. Returns how many files were deleted.
    pub fn clear(&self) -> Result<usize> {
        if !self.root.exists() {
            return Ok(0);
        }
        let mut removed = 0;
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file() && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_same_content_same_path() {
        let dir = TempDir::new().unwrap();
        let cache = ContentCache::new(dir.path().join("artifacts"));

        let a = cache.get_or_create(b"class Foo {}", "groovy").unwrap();
        let b = cache.get_or_create(b"class Foo {}", "groovy").unwrap();
        assert_eq!(a, b);
        assert_eq!(fs::read(&a).unwrap(), b"class Foo {}");
        assert_eq!(a.extension().unwrap(), "groovy");

        let c = cache.get_or_create(b"class Bar {}", "groovy").unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let cache = ContentCache::new(dir.path());
        cache.get_or_create(b"one", "txt").unwrap();
        cache.get_or_create(b"one", "txt").unwrap();
        cache.get_or_create(b"two", "txt").unwrap();
        let files = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 2);
        assert_eq!(cache.clear().unwrap(), 2);
    }

    #[test]
    fn test_sha256_hex_is_stable() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
