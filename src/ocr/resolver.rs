//! Selection of the authoritative OCR directory.

use super::OcrRepresentation;
use crate::error::{Error, Result};
use crate::storage::Storage;
use crate::work_item::WorkItem;
use std::path::PathBuf;

/// The OCR directory chosen for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrSource {
    /// Representation stored in `directory`
    pub representation: OcrRepresentation,
    /// Directory whose files will be aggregated
    pub directory: PathBuf,
}

/// Pick the OCR source of a work item.
///
/// The plain-text directory always wins when it exists; the ALTO directory
/// is only checked otherwise. A path only counts when it is a directory.
pub fn resolve(storage: &dyn Storage, item: &WorkItem) -> Result<OcrSource> {
    if storage.is_existing_directory(&item.text_dir) {
        return Ok(OcrSource {
            representation: OcrRepresentation::PlainText,
            directory: item.text_dir.clone(),
        });
    }

    if storage.is_existing_directory(&item.alto_dir) {
        return Ok(OcrSource {
            representation: OcrRepresentation::Alto,
            directory: item.alto_dir.clone(),
        });
    }

    Err(Error::NoOcrSource {
        text_dir: item.text_dir.clone(),
        alto_dir: item.alto_dir.clone(),
    })
}
