// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::result_large_err)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # OCR to Metadata
//!
//! Folds per-item OCR output into a single metadata field of a bibliographic
//! record.
//!
//! ## Pipeline
//!
//! 1. **Resolve** the OCR source: the plain-text directory wins over the ALTO
//!    directory when both exist.
//! 2. **Load** the metadata record and locate its logical root.
//! 3. **Plan** the field: replace an existing instance, or insert a new one
//!    if the ruleset allows it. Invalid configurations fail here, before any
//!    OCR file is read.
//! 4. **Aggregate** the text of every OCR file in name order. ALTO pages are
//!    joined with `\n`; files are concatenated as-is. Unreadable files count
//!    as empty.
//! 5. **Apply** the new value and **save** the record.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ocr_to_metadata::config::StepConfig;
//! use ocr_to_metadata::journal::LogJournal;
//! use ocr_to_metadata::metadata::{JsonRecordStore, Ruleset};
//! use ocr_to_metadata::storage::LocalStorage;
//! use ocr_to_metadata::step::OcrToMetadataStep;
//! use ocr_to_metadata::work_item::WorkItem;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ruleset = Ruleset::from_json_file("ruleset.json")?;
//! let store = JsonRecordStore::new();
//! let step = OcrToMetadataStep::new(
//!     StepConfig::new("ocrText"),
//!     &LocalStorage,
//!     &store,
//!     &ruleset,
//!     &LogJournal,
//! );
//!
//! let item = WorkItem::from_process_dir(42, "book_1850", "/data/metadata/42");
//! let outcome = step.run(&item);
//! println!("success: {}", outcome.is_success());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Host-supplied context and collaborators
pub mod config;
pub mod journal;
pub mod storage;
pub mod work_item;

// OCR source resolution, ALTO parsing and aggregation
pub mod ocr;

// Metadata record model, schema and reconciliation
pub mod metadata;

// Orchestration
pub mod step;

// Re-exports
pub use config::{FailurePolicy, PluginConfig, StepConfig};
pub use error::{Error, Result};
pub use ocr::{AggregatedText, AltoDocument, OcrRepresentation};
pub use step::{OcrToMetadataStep, RunSummary, StepOutcome};
pub use work_item::WorkItem;

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
