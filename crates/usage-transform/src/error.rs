//! Error types for the transform stages.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Structural assumptions about an export sheet were violated.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MalformedSheetError {
    /// A required metadata column is absent.
    #[error("sheet '{sheet}': required column '{column}' is missing")]
    MissingColumn {
        sheet: String,
        column: &'static str,
    },

    /// Not enough rows remain once the summary trailer is accounted for.
    #[error("sheet '{sheet}': {rows} rows is too few for a {trailer}-row summary trailer")]
    TooFewRows {
        sheet: String,
        rows: usize,
        trailer: usize,
    },

    /// No column header parsed as a calendar date.
    #[error("sheet '{sheet}': no date columns found")]
    NoDateColumns { sheet: String },
}

/// Errors from the reshape stage.
#[derive(Debug, Error)]
pub enum ReshapeError {
    #[error(transparent)]
    Malformed(#[from] MalformedSheetError),

    /// Assembling the long-format frame failed.
    #[error("failed to build frame for '{key}': {source}")]
    Frame {
        key: String,
        #[source]
        source: PolarsError,
    },
}

/// Errors from the merge stage.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Merge invoked with nothing to merge.
    #[error("cannot merge an empty set of tables")]
    EmptyMergeSet,

    /// A contributing table lacks a required column.
    #[error("table '{key}': required column '{column}' is missing")]
    MissingColumn { key: String, column: String },

    #[error("failed to build merged frame for '{key}': {source}")]
    Frame {
        key: String,
        #[source]
        source: PolarsError,
    },
}

/// Errors from the gap-fill stage.
#[derive(Debug, Error)]
pub enum GapFillError {
    /// Resample over a table with no rows: no min/max date exists.
    #[error("table '{key}' has no rows to resample")]
    EmptyRange { key: String },

    /// The table has no `date` column.
    #[error("table '{key}': date column is missing")]
    MissingDateColumn { key: String },

    /// A date cell did not parse.
    #[error("table '{key}': invalid date value '{value}'")]
    BadDate { key: String, value: String },

    #[error("failed to build resampled frame for '{key}': {source}")]
    Frame {
        key: String,
        #[source]
        source: PolarsError,
    },
}
