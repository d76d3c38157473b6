//! Error types for k6report.
//!
//! Only conditions that end a run are errors. A line that fails to decode, or
//! a record whose shape is not recognized, is dropped by the reader or the
//! classifier and never surfaces here.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for all k6report operations.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Error obtaining records from the input source.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Error emitting a rendered summary.
    #[error("output error: {0}")]
    Output(#[from] OutputError),
}

/// Errors raised while pulling records from the input source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The input could not be opened.
    ///
    /// The caller must refuse to run; there is nothing to summarize.
    #[error("failed to open input '{}': {source}", path.display())]
    Unavailable {
        /// The path that could not be opened.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Reading the next line failed part-way through the input.
    #[error("failed to read input at line {line}: {source}")]
    Read {
        /// 1-based number of the line being read.
        line: u64,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// Returns `true` if the input does not exist at all.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

/// Errors raised while emitting a rendered summary.
#[derive(Error, Debug)]
pub enum OutputError {
    /// Failed to serialize the summary.
    #[error("failed to serialize summary: {source}")]
    Serialize {
        /// The underlying JSON serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to write the rendered report.
    #[error("failed to write report to '{}': {source}", path.display())]
    Write {
        /// The destination path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for `Result<T, ReportError>`.
pub type Result<T> = std::result::Result<T, ReportError>;
