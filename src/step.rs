//! The OCR-to-metadata workflow step.
//!
//! ```text
//! resolve OCR source ─▶ read record ─▶ plan field ─▶ aggregate text
//!                                                        │
//!                        write record ◀─ apply field ◀───┘
//! ```
//!
//! Each stage only runs when the previous one succeeded; the first failure
//! ends the run. The field is validated before any OCR file is read, and the
//! record is only written after the in-memory mutation, so a failed run
//! never leaves a half-updated record behind.

use crate::config::StepConfig;
use crate::error::{Error, Result};
use crate::journal::{Journal, JournalLevel};
use crate::metadata::{apply_field, plan_field, FieldChange, RecordStore, SchemaProvider};
use crate::ocr::{resolver, OcrRepresentation, TextAggregator};
use crate::storage::Storage;
use crate::work_item::WorkItem;
use std::path::PathBuf;

const MESSAGE_PREFIX: &str = "OcrToMetadata Step Plugin: ";

/// Statistics of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Representation that was aggregated
    pub representation: OcrRepresentation,
    /// Directory that was aggregated
    pub directory: PathBuf,
    /// Files whose content was read
    pub files_read: usize,
    /// Files that failed and counted as empty
    pub files_failed: usize,
    /// Length of the stored text in characters
    pub text_chars: usize,
    /// Whether an existing value was replaced
    pub replaced: bool,
}

/// Terminal outcome reported to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The record was updated
    Finish(RunSummary),
    /// The run failed; carries a human-readable reason
    Error(String),
}

impl StepOutcome {
    /// Whether the host may proceed.
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Finish(_))
    }

    /// Failure reason, if the run failed.
    pub fn reason(&self) -> Option<&str> {
        match self {
            StepOutcome::Finish(_) => None,
            StepOutcome::Error(reason) => Some(reason),
        }
    }
}

/// Writes the aggregated OCR text of a work item into one metadata field.
pub struct OcrToMetadataStep<'a> {
    config: StepConfig,
    storage: &'a dyn Storage,
    records: &'a dyn RecordStore,
    schema: &'a dyn SchemaProvider,
    journal: &'a dyn Journal,
}

impl<'a> OcrToMetadataStep<'a> {
    /// Wire the step to its collaborators.
    pub fn new(
        config: StepConfig,
        storage: &'a dyn Storage,
        records: &'a dyn RecordStore,
        schema: &'a dyn SchemaProvider,
        journal: &'a dyn Journal,
    ) -> Self {
        log::debug!("metadataField = {}", config.metadata_field);
        Self {
            config,
            storage,
            records,
            schema,
            journal,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &StepConfig {
        &self.config
    }

    /// Run the step for one work item and report a single terminal outcome.
    pub fn run(&self, item: &WorkItem) -> StepOutcome {
        match self.execute(item) {
            Ok(summary) => {
                log::info!(
                    "OcrToMetadata step executed for {}: {} chars from {} file(s) ({})",
                    item.id,
                    summary.text_chars,
                    summary.files_read,
                    summary.representation
                );
                StepOutcome::Finish(summary)
            },
            Err(e) => {
                let reason = e.to_string();
                self.report(item, JournalLevel::Error, &reason);
                StepOutcome::Error(reason)
            },
        }
    }

    /// Run the step, returning the first failure as an error.
    pub fn execute(&self, item: &WorkItem) -> Result<RunSummary> {
        self.config.validate()?;
        let field = self.config.metadata_field.as_str();

        let source = resolver::resolve(self.storage, item)?;
        log::debug!("Using {} OCR from {}", source.representation, source.directory.display());

        let mut record = self.records.read_record(item)?;
        let plan = plan_field(record.logical(), field, self.schema)?;

        let aggregation = TextAggregator::new(self.storage)
            .with_failure_policy(self.config.failure_policy)
            .aggregate(&source.directory, source.representation)?;
        for failure in &aggregation.failures {
            self.report(item, JournalLevel::Error, &failure.to_string());
        }

        let files_read = aggregation.files_read();
        let files_failed = aggregation.failures.len();
        let text = aggregation.text.into_option().ok_or_else(|| Error::NoTextExtracted {
            directory: source.directory.clone(),
        })?;
        let text_chars = text.chars().count();

        let change = apply_field(record.logical_mut(), field, plan, text);
        if let FieldChange::Replaced {
            removed_duplicates, ..
        } = &change
        {
            if *removed_duplicates > 0 {
                self.report(
                    item,
                    JournalLevel::Warn,
                    &format!("removed {} duplicate '{}' value(s)", removed_duplicates, field),
                );
            }
        }

        self.records.write_record(item, &record)?;

        Ok(RunSummary {
            representation: source.representation,
            directory: source.directory,
            files_read,
            files_failed,
            text_chars,
            replaced: change.is_replacement(),
        })
    }

    /// Log a message and, for real processes, add it to the journal.
    fn report(&self, item: &WorkItem, level: JournalLevel, message: &str) {
        let message = format!("{}{}", MESSAGE_PREFIX, message);
        log::log!(level.as_log_level(), "{}", message);
        if item.id > 0 {
            self.journal.record(level, &message);
        }
    }
}
