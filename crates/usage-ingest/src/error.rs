//! Error types for ingestion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading export files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IngestError {
    /// Directory listing failed.
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to open or parse a delimited sheet file.
    #[error("failed to read sheet {path}: {source}")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
