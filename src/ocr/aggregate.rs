//! Folding every OCR file of a directory into one text value.

use super::alto::AltoExtractor;
use super::OcrRepresentation;
use crate::config::FailurePolicy;
use crate::error::{Error, Result};
use crate::storage::Storage;
use std::path::{Path, PathBuf};

/// Concatenated OCR text of a work item.
///
/// `Empty` is returned instead of an empty string so callers cannot mistake
/// "nothing found" for a value worth persisting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregatedText {
    /// Non-empty concatenated text
    Content(String),
    /// No file yielded any content
    Empty,
}

impl AggregatedText {
    fn from_string(text: String) -> Self {
        if text.is_empty() {
            Self::Empty
        } else {
            Self::Content(text)
        }
    }

    /// Whether no content was found.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The text, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Content(text) => Some(text),
            Self::Empty => None,
        }
    }

    /// Consume into the text, if any.
    pub fn into_option(self) -> Option<String> {
        match self {
            Self::Content(text) => Some(text),
            Self::Empty => None,
        }
    }
}

/// Result of aggregating one directory.
#[derive(Debug)]
pub struct Aggregation {
    /// The concatenated text
    pub text: AggregatedText,
    /// Files listed in the directory, in reading order
    pub files: Vec<PathBuf>,
    /// Per-file failures that were absorbed
    pub failures: Vec<Error>,
}

impl Aggregation {
    /// Number of files whose content was read successfully.
    pub fn files_read(&self) -> usize {
        self.files.len() - self.failures.len()
    }
}

/// Reads and concatenates the files of an OCR directory.
pub struct TextAggregator<'a> {
    storage: &'a dyn Storage,
    policy: FailurePolicy,
}

impl<'a> TextAggregator<'a> {
    /// Create an aggregator that absorbs per-file failures.
    pub fn new(storage: &'a dyn Storage) -> Self {
        Self {
            storage,
            policy: FailurePolicy::Absorb,
        }
    }

    /// Set how per-file failures are handled.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Aggregate every file in `directory` in listing order.
    ///
    /// Files are concatenated without a separator. A file that cannot be read
    /// contributes nothing; with [`FailurePolicy::Abort`] it fails the call
    /// instead.
    pub fn aggregate(&self, directory: &Path, representation: OcrRepresentation) -> Result<Aggregation> {
        let files = self.storage.list_files(directory);
        let mut text = String::new();
        let mut failures = Vec::new();

        for file in &files {
            log::debug!("file = {}", file.display());
            match self.extract(file, representation) {
                Ok(content) => text.push_str(&content),
                Err(e) if self.policy == FailurePolicy::Abort => return Err(e),
                Err(e) => failures.push(e),
            }
        }

        log::debug!(
            "Aggregated {} file(s) from {} into {} byte(s)",
            files.len(),
            directory.display(),
            text.len()
        );

        Ok(Aggregation {
            text: AggregatedText::from_string(text),
            files,
            failures,
        })
    }

    fn extract(&self, file: &Path, representation: OcrRepresentation) -> Result<String> {
        match representation {
            OcrRepresentation::PlainText => read_text_file(self.storage, file),
            OcrRepresentation::Alto => AltoExtractor::extract(self.storage, file),
        }
    }
}

/// Read a plain-text OCR file as UTF-8.
///
/// Invalid sequences are replaced with U+FFFD rather than failing the file.
pub fn read_text_file(storage: &dyn Storage, path: &Path) -> Result<String> {
    let bytes = storage.read_all(path).map_err(|source| Error::TextFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
