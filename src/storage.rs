//! Filesystem access used by the step.
//!
//! The pipeline never touches `std::fs` directly; it goes through [`Storage`]
//! so hosts can substitute their own storage provider.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Filesystem capability consumed by the resolver and the aggregator.
pub trait Storage {
    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is a directory.
    fn is_directory(&self, path: &Path) -> bool;

    /// List the regular files directly inside `directory`.
    ///
    /// The order must be stable across repeated calls.
    fn list_files(&self, directory: &Path) -> Vec<PathBuf>;

    /// Read the whole file into memory.
    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Whether `path` exists and is a directory (not a file).
    fn is_existing_directory(&self, path: &Path) -> bool {
        self.exists(path) && self.is_directory(path)
    }
}

/// [`Storage`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    /// Create a new local storage provider.
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    /// Regular files sorted by file name; an unreadable directory lists as empty.
    fn list_files(&self, directory: &Path) -> Vec<PathBuf> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Cannot list {}: {}", directory.display(), e);
                return Vec::new();
            },
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| e.path())
            .collect();
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        files
    }

    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}
