//! Error types for the OCR-to-metadata step.
//!
//! This module defines every failure a run can report. Per-file extraction
//! failures (`AltoParse`, `TextFileRead`) are normally absorbed by the
//! aggregator; all other variants end the run.

use std::path::PathBuf;

/// Result type alias for OCR-to-metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while folding OCR output into a metadata record.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Neither the plain-text nor the ALTO directory exists
    #[error("No OCR source found: neither '{}' nor '{}' is a directory", .text_dir.display(), .alto_dir.display())]
    NoOcrSource {
        /// Plain-text directory that was checked
        text_dir: PathBuf,
        /// ALTO directory that was checked
        alto_dir: PathBuf,
    },

    /// One ALTO file is malformed or unreadable
    #[error("Failed to read the content from the ALTO file {}: {reason}", .path.display())]
    AltoParse {
        /// The offending file
        path: PathBuf,
        /// Reason for the parse failure
        reason: String,
    },

    /// One plain-text file could not be read
    #[error("Failed to read the content from the text file {}: {source}", .path.display())]
    TextFileRead {
        /// The offending file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Aggregation produced no content at all
    #[error("No text extracted from {}", .directory.display())]
    NoTextExtracted {
        /// Directory that was aggregated
        directory: PathBuf,
    },

    /// The configured field is neither present nor addable on the node
    #[error("Metadata type '{field}' is not allowed on '{node_type}'")]
    FieldNotAllowed {
        /// Configured field-type name
        field: String,
        /// Type of the target node
        node_type: String,
    },

    /// The metadata record could not be loaded
    #[error("Failed to read the metadata record {}: {reason}", .path.display())]
    RecordRead {
        /// Location of the record
        path: PathBuf,
        /// Reason for the failure
        reason: String,
    },

    /// The metadata record could not be saved
    #[error("Failed to save the metadata record {}: {reason}", .path.display())]
    RecordWrite {
        /// Location of the record
        path: PathBuf,
        /// Reason for the failure
        reason: String,
    },

    /// Invalid or missing step configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error describes a single bad OCR file rather than the whole run.
    pub fn is_per_file(&self) -> bool {
        matches!(self, Error::AltoParse { .. } | Error::TextFileRead { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_ocr_source_error() {
        let err = Error::NoOcrSource {
            text_dir: PathBuf::from("/p/ocr/book_txt"),
            alto_dir: PathBuf::from("/p/ocr/book_alto"),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("No OCR source"));
        assert!(msg.contains("book_txt"));
        assert!(msg.contains("book_alto"));
    }

    #[test]
    fn test_alto_parse_error_carries_path() {
        let err = Error::AltoParse {
            path: PathBuf::from("/p/ocr/book_alto/00000001.xml"),
            reason: "unexpected end of document".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("00000001.xml"));
        assert!(msg.contains("unexpected end"));
        assert!(err.is_per_file());
    }

    #[test]
    fn test_field_not_allowed_error() {
        let err = Error::FieldNotAllowed {
            field: "ocrText".to_string(),
            node_type: "Monograph".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("ocrText"));
        assert!(msg.contains("Monograph"));
        assert!(!err.is_per_file());
    }

    #[test]
    fn test_text_file_read_keeps_source() {
        use std::error::Error as _;

        let err = Error::TextFileRead {
            path: PathBuf::from("p1.txt"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(err.is_per_file());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
