//! Classpath index: simple-name lookup over compiled dependency archives.

pub mod index;
pub mod scanner;

pub use index::{ClasspathIndex, IndexState, NameIndex};
pub use scanner::{ArchiveScanner, ClasspathEntry, ClasspathScanner};
