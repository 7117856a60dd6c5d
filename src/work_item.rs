//! The digitization unit processed by one run.

use std::path::{Path, PathBuf};

/// One digitization unit and the OCR directories that belong to it.
///
/// A work item is read-only context for the step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Process id; journal entries are only written for positive ids
    pub id: i64,
    /// Process title, used to derive directory names
    pub title: String,
    /// Process directory holding the metadata record
    pub process_dir: PathBuf,
    /// OCR root directory
    pub ocr_root: PathBuf,
    /// Plain-text OCR directory
    pub text_dir: PathBuf,
    /// ALTO OCR directory
    pub alto_dir: PathBuf,
}

impl WorkItem {
    /// Create a work item with explicit directories.
    pub fn new(
        id: i64,
        title: impl Into<String>,
        process_dir: impl Into<PathBuf>,
        text_dir: impl Into<PathBuf>,
        alto_dir: impl Into<PathBuf>,
    ) -> Self {
        let process_dir = process_dir.into();
        Self {
            id,
            title: title.into(),
            ocr_root: process_dir.join("ocr"),
            process_dir,
            text_dir: text_dir.into(),
            alto_dir: alto_dir.into(),
        }
    }

    /// Derive all directories from the process directory layout:
    /// `ocr/{title}_txt` and `ocr/{title}_alto`.
    pub fn from_process_dir(id: i64, title: impl Into<String>, process_dir: impl AsRef<Path>) -> Self {
        let title = title.into();
        let process_dir = process_dir.as_ref().to_path_buf();
        let ocr_root = process_dir.join("ocr");
        Self {
            id,
            text_dir: ocr_root.join(format!("{}_txt", title)),
            alto_dir: ocr_root.join(format!("{}_alto", title)),
            ocr_root,
            process_dir,
            title,
        }
    }

    /// Override the OCR root directory.
    pub fn with_ocr_root(mut self, ocr_root: impl Into<PathBuf>) -> Self {
        self.ocr_root = ocr_root.into();
        self
    }
}
