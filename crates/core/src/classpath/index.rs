//! Classpath name index.
//!
//! Every classpath update starts a new generation. A generation is scanned at
//! most once; concurrent requests wait on the same scan. Results of an older
//! generation are never consulted once a newer one is installed.

use super::scanner::{ClasspathEntry, ClasspathScanner};
use crate::error::{GroovyscopeError, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::OnceCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Empty,
    Indexing,
    Ready,
}

/// Immutable result of one classpath scan.
#[derive(Debug, Default)]
pub struct NameIndex {
    /// Lowercased simple name -> classes with that name.
    by_simple: BTreeMap<String, Vec<ClasspathEntry>>,
    by_fqn: HashMap<String, ClasspathEntry>,
}

impl NameIndex {
    /// An entry that cannot be read is logged and skipped. The build fails
    /// only when no entry could be read at all.
    pub fn build(scanner: &dyn ClasspathScanner, paths: &[PathBuf]) -> Result<Self> {
        let mut index = Self::default();
        let mut scanned = 0usize;
        let mut last_error = None;
        for path in paths {
            if !scanner.can_scan(path) {
                tracing::debug!("Skipping classpath entry {}", path.display());
                continue;
            }
            match scanner.scan(path) {
                Ok(entries) => {
                    scanned += 1;
                    for entry in entries {
                        index.insert(entry);
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to index classpath entry {}: {}", path.display(), e);
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) if scanned == 0 => return Err(e),
            _ => {}
        }
        for entries in index.by_simple.values_mut() {
            entries.sort_by(|a, b| a.simple_name.cmp(&b.simple_name).then(a.fqn.cmp(&b.fqn)));
        }
        Ok(index)
    }

    /// Earlier classpath entries shadow later ones.
    fn insert(&mut self, entry: ClasspathEntry) {
        if self.by_fqn.contains_key(&entry.fqn) {
            return;
        }
        self.by_simple
            .entry(entry.simple_name.to_lowercase())
            .or_default()
            .push(entry.clone());
        self.by_fqn.insert(entry.fqn.clone(), entry);
    }

    pub fn len(&self) -> usize {
        self.by_fqn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_fqn.is_empty()
    }

    /// Case-insensitive prefix match on the simple name, sorted by simple name
    /// then FQN.
    pub fn find_by_prefix(&self, prefix: &str, max_results: usize) -> Vec<ClasspathEntry> {
        let prefix = prefix.to_lowercase();
        let mut found: Vec<ClasspathEntry> = self
            .by_simple
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .flat_map(|(_, entries)| entries.iter().cloned())
            .collect();
        found.sort_by(|a, b| a.simple_name.cmp(&b.simple_name).then(a.fqn.cmp(&b.fqn)));
        found.truncate(max_results);
        found
    }

    /// Exact, case-sensitive simple name lookup.
    pub fn classes_for_simple_name(&self, name: &str) -> Vec<String> {
        self.by_simple
            .get(&name.to_lowercase())
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.simple_name == name)
                    .map(|e| e.fqn.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn entry(&self, fqn: &str) -> Option<&ClasspathEntry> {
        self.by_fqn.get(fqn)
    }
}

struct Generation {
    id: u64,
    paths: Arc<[PathBuf]>,
    cell: OnceCell<Arc<NameIndex>>,
    in_flight: AtomicBool,
}

impl Generation {
    fn new(id: u64, paths: Vec<PathBuf>) -> Self {
        Self {
            id,
            paths: paths.into(),
            cell: OnceCell::new(),
            in_flight: AtomicBool::new(false),
        }
    }

    fn state(&self) -> IndexState {
        if self.cell.initialized() {
            IndexState::Ready
        } else if self.in_flight.load(Ordering::Acquire) {
            IndexState::Indexing
        } else {
            IndexState::Empty
        }
    }

    async fn load(self: Arc<Self>, scanner: Arc<dyn ClasspathScanner>) -> Result<Arc<NameIndex>> {
        let this = self.clone();
        let index = self
            .cell
            .get_or_try_init(|| async move {
                this.in_flight.store(true, Ordering::Release);
                let paths = this.paths.clone();
                let scanned =
                    tokio::task::spawn_blocking(move || NameIndex::build(&*scanner, &paths)).await;
                this.in_flight.store(false, Ordering::Release);

                match scanned {
                    Ok(Ok(index)) => {
                        tracing::info!(
                            "Classpath generation {} indexed: {} classes from {} entries",
                            this.id,
                            index.len(),
                            this.paths.len()
                        );
                        Ok(Arc::new(index))
                    }
                    Ok(Err(e)) => {
                        tracing::warn!("Classpath generation {} scan failed: {}", this.id, e);
                        Err(e)
                    }
                    Err(e) => {
                        tracing::warn!("Classpath generation {} scan aborted: {}", this.id, e);
                        Err(GroovyscopeError::Classpath(e.to_string()))
                    }
                }
            })
            .await?;
        Ok(index.clone())
    }
}

pub struct ClasspathIndex {
    scanner: Arc<dyn ClasspathScanner>,
    current: RwLock<Arc<Generation>>,
    next_id: AtomicU64,
}

impl ClasspathIndex {
    pub fn new(scanner: Arc<dyn ClasspathScanner>) -> Self {
        Self {
            scanner,
            current: RwLock::new(Arc::new(Generation::new(0, Vec::new()))),
            next_id: AtomicU64::new(1),
        }
    }

    fn current(&self) -> Arc<Generation> {
        self.current.read().clone()
    }

    pub fn generation(&self) -> u64 {
        self.current().id
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.current().paths.to_vec()
    }

    pub fn state(&self) -> IndexState {
        self.current().state()
    }

    /// Install a new classpath. The previous index is dropped; the new one
    /// starts `Empty`. Returns the new generation id.
    pub fn update_classpath(&self, paths: Vec<PathBuf>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let count = paths.len();
        *self.current.write() = Arc::new(Generation::new(id, paths));
        tracing::info!("Classpath generation {} installed ({} entries)", id, count);
        id
    }

    /// Index the current generation, or wait for the scan already running.
    ///
    /// The scan runs on its own task, so dropping this future does not cancel
    /// it. A failed scan leaves the generation `Empty` and is retried on the
    /// next call.
    pub async fn index_all(&self) -> Result<Arc<NameIndex>> {
        let generation = self.current();
        if let Some(index) = generation.cell.get() {
            return Ok(index.clone());
        }
        let scanner = self.scanner.clone();
        tokio::spawn(generation.load(scanner))
            .await
            .map_err(|e| GroovyscopeError::Internal(e.to_string()))?
    }

    /// Start indexing in the background if the current generation needs it.
    /// Outside a tokio runtime this does nothing.
    pub fn ensure_indexing(&self) {
        let generation = self.current();
        if generation.state() != IndexState::Empty {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let scanner = self.scanner.clone();
        handle.spawn(async move {
            // Failures are already logged by the scan.
            let _ = generation.load(scanner).await;
        });
    }

    /// Index of the current generation if it is `Ready`. Otherwise kicks off
    /// a background scan and returns `None`.
    pub fn ready_index(&self) -> Option<Arc<NameIndex>> {
        let index = self.current().cell.get().cloned();
        if index.is_none() {
            self.ensure_indexing();
        }
        index
    }

    pub fn find_by_prefix(&self, prefix: &str, max_results: usize) -> Vec<ClasspathEntry> {
        self.ready_index()
            .map(|index| index.find_by_prefix(prefix, max_results))
            .unwrap_or_default()
    }

    pub fn classes_for_simple_name(&self, name: &str) -> Vec<String> {
        self.ready_index()
            .map(|index| index.classes_for_simple_name(name))
            .unwrap_or_default()
    }

    pub fn archive_for(&self, fqn: &str) -> Option<PathBuf> {
        self.ready_index()
            .and_then(|index| index.entry(fqn).map(|e| e.archive.clone()))
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.current().paths.iter().any(|p| p == path)
    }
}
