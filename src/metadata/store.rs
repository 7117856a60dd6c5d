//! Loading and saving metadata records.

use super::MetadataRecord;
use crate::error::{Error, Result};
use crate::work_item::WorkItem;
use std::fs;
use std::path::{Path, PathBuf};

/// Record store collaborator: loads and persists a work item's record.
pub trait RecordStore {
    /// Load the record of `item`.
    fn read_record(&self, item: &WorkItem) -> Result<MetadataRecord>;

    /// Persist `record` as the record of `item`.
    fn write_record(&self, item: &WorkItem, record: &MetadataRecord) -> Result<()>;
}

/// Stores records as pretty-printed JSON in the process directory.
///
/// Before a record is overwritten, previous versions are rotated into
/// numbered backups (`meta.json.1` is the newest). The new content is
/// written to a temporary sibling and renamed into place.
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    file_name: String,
    backups: usize,
}

impl Default for JsonRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRecordStore {
    /// Store using `meta.json` with three backups.
    pub fn new() -> Self {
        Self {
            file_name: "meta.json".to_string(),
            backups: 3,
        }
    }

    /// Use a different record file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Number of backups to keep (0 disables backups).
    pub fn with_backups(mut self, backups: usize) -> Self {
        self.backups = backups;
        self
    }

    /// Location of the record of `item`.
    pub fn record_path(&self, item: &WorkItem) -> PathBuf {
        item.process_dir.join(&self.file_name)
    }

    fn sibling(path: &Path, suffix: &str) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    fn backup_path(path: &Path, n: usize) -> PathBuf {
        Self::sibling(path, &format!(".{}", n))
    }

    fn rotate_backups(&self, path: &Path) -> std::io::Result<()> {
        if self.backups == 0 || !path.exists() {
            return Ok(());
        }

        for n in (1..self.backups).rev() {
            let older = Self::backup_path(path, n);
            if older.exists() {
                fs::rename(&older, Self::backup_path(path, n + 1))?;
            }
        }
        fs::copy(path, Self::backup_path(path, 1))?;
        Ok(())
    }
}

impl RecordStore for JsonRecordStore {
    fn read_record(&self, item: &WorkItem) -> Result<MetadataRecord> {
        let path = self.record_path(item);
        let read_error = |reason: String| Error::RecordRead {
            path: path.clone(),
            reason,
        };

        let bytes = fs::read(&path).map_err(|e| read_error(e.to_string()))?;
        let record = serde_json::from_slice(&bytes).map_err(|e| read_error(e.to_string()))?;
        log::debug!("Read metadata record {}", path.display());
        Ok(record)
    }

    fn write_record(&self, item: &WorkItem, record: &MetadataRecord) -> Result<()> {
        let path = self.record_path(item);
        let write_error = |reason: String| Error::RecordWrite {
            path: path.clone(),
            reason,
        };

        let json = serde_json::to_vec_pretty(record).map_err(|e| write_error(e.to_string()))?;
        self.rotate_backups(&path)
            .map_err(|e| write_error(format!("backup failed: {}", e)))?;

        let tmp = Self::sibling(&path, ".tmp");
        fs::write(&tmp, &json).map_err(|e| write_error(e.to_string()))?;
        fs::rename(&tmp, &path).map_err(|e| write_error(e.to_string()))?;

        log::debug!("Wrote metadata record {}", path.display());
        Ok(())
    }
}
