//! OCR source resolution and text aggregation.
//!
//! ```text
//! WorkItem ──resolve──▶ OcrSource ──aggregate──▶ AggregatedText
//!                     (PlainText | Alto)
//! ```

pub mod aggregate;
pub mod alto;
pub mod resolver;

pub use aggregate::{AggregatedText, Aggregation, TextAggregator};
pub use alto::{AltoDocument, AltoExtractor, AltoPage, AltoTextBlock};
pub use resolver::{resolve, OcrSource};

use std::fmt;

/// Representation of the OCR output selected for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcrRepresentation {
    /// One plain-text file per page
    PlainText,
    /// ALTO XML files
    Alto,
}

impl fmt::Display for OcrRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OcrRepresentation::PlainText => write!(f, "plain text"),
            OcrRepresentation::Alto => write!(f, "ALTO"),
        }
    }
}
