//! Timestamp-indexed dataset: in-memory frame, CSV ingestion, and calendar features.

pub mod features;
pub mod frame;
pub mod loader;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use features::TimeFeature;
pub use frame::{FrameSlice, TimeFrame};

/// Errors raised while building or loading a [`TimeFrame`].
#[derive(Debug, Error)]
pub enum DataError {
    /// The dataset file could not be opened.
    #[error("cannot read \"{path}\": {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The CSV reader failed (malformed quoting, invalid UTF-8, ...).
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    /// The header row has no index column.
    #[error("missing header row")]
    MissingHeader,
    /// The file has a header but no data rows.
    #[error("dataset has no rows")]
    Empty,
    /// A timestamp in the index column did not match any supported format.
    #[error("line {line}: cannot parse timestamp \"{value}\"")]
    BadTimestamp { line: usize, value: String },
    /// A data row has a different number of fields than the header.
    #[error("line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
    /// Two columns share a name.
    #[error("duplicate column \"{0}\"")]
    DuplicateColumn(String),
    /// A column vector length disagrees with the index length.
    #[error("column \"{column}\" has {found} values, index has {expected}")]
    ShapeMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
}
