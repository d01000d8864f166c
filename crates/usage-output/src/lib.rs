//! Delimited-text persistence for long-format usage tables.
//!
//! Tables are written one file per category, semicolon-delimited, with the
//! `date` column first (ISO `%Y-%m-%d`) and numeric cells formatted without
//! trailing zeros. Reading a written file back yields the same values.

use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use polars::prelude::{AnyValue, DataFrame, NamedFrom, Series};
use thiserror::Error;
use tracing::debug;

use usage_transform::{CategoryFrame, DATE_COLUMN};

/// Delimiter used for all processed output files.
pub const OUTPUT_DELIMITER: u8 = b';';

/// Errors that can occur while persisting or reloading tables.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    CsvWrite {
        path: std::path::PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read {path}: {source}")]
    CsvRead {
        path: std::path::PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("file {path} has no date column")]
    MissingDateColumn { path: std::path::PathBuf },

    #[error("failed to rebuild frame from {path}: {source}")]
    Frame {
        path: std::path::PathBuf,
        #[source]
        source: polars::prelude::PolarsError,
    },
}

/// Formats a floating-point number as a string without trailing zeros.
fn format_numeric(value: f64) -> String {
    let rendered = format!("{value}");
    let trimmed = if rendered.contains('.') {
        rendered.trim_end_matches('0').trim_end_matches('.')
    } else {
        rendered.as_str()
    };
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn cell_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Write one category table to a delimited file.
pub fn write_frame(frame: &CategoryFrame, path: &Path) -> Result<(), OutputError> {
    let mut writer = WriterBuilder::new()
        .delimiter(OUTPUT_DELIMITER)
        .from_path(path)
        .map_err(|source| OutputError::CsvWrite {
            path: path.to_path_buf(),
            source,
        })?;

    let headers: Vec<String> = frame
        .data
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    writer
        .write_record(&headers)
        .map_err(|source| OutputError::CsvWrite {
            path: path.to_path_buf(),
            source,
        })?;

    for row in 0..frame.data.height() {
        let mut record: Vec<String> = Vec::with_capacity(headers.len());
        for name in &headers {
            let value = frame
                .data
                .column(name)
                .ok()
                .and_then(|column| column.get(row).ok())
                .unwrap_or(AnyValue::Null);
            record.push(cell_to_string(value));
        }
        writer
            .write_record(&record)
            .map_err(|source| OutputError::CsvWrite {
                path: path.to_path_buf(),
                source,
            })?;
    }
    writer.flush().map_err(|source| OutputError::CsvWrite {
        path: path.to_path_buf(),
        source: csv::Error::from(source),
    })?;
    debug!(path = %path.display(), rows = frame.data.height(), "wrote table");
    Ok(())
}

/// Read a previously written table back into a [`CategoryFrame`].
///
/// The category key is derived from the file stem. The `date` column is
/// kept as ISO strings; every other column is parsed as nullable f64.
pub fn read_frame(path: &Path) -> Result<CategoryFrame, OutputError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(OUTPUT_DELIMITER)
        .has_headers(true)
        .from_path(path)
        .map_err(|source| OutputError::CsvRead {
            path: path.to_path_buf(),
            source,
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| OutputError::CsvRead {
            path: path.to_path_buf(),
            source,
        })?
        .iter()
        .map(str::to_string)
        .collect();
    if !headers.iter().any(|h| h == DATE_COLUMN) {
        return Err(OutputError::MissingDateColumn {
            path: path.to_path_buf(),
        });
    }

    let mut dates: Vec<String> = Vec::new();
    let mut value_columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.map_err(|source| OutputError::CsvRead {
            path: path.to_path_buf(),
            source,
        })?;
        for (idx, header) in headers.iter().enumerate() {
            let cell = record.get(idx).unwrap_or("").trim();
            if header == DATE_COLUMN {
                dates.push(cell.to_string());
            } else {
                value_columns[idx].push(if cell.is_empty() {
                    None
                } else {
                    cell.parse::<f64>().ok()
                });
            }
        }
    }

    let mut columns = vec![Series::new(DATE_COLUMN.into(), dates).into()];
    for (idx, header) in headers.iter().enumerate() {
        if header == DATE_COLUMN {
            continue;
        }
        columns.push(Series::new(header.as_str().into(), std::mem::take(&mut value_columns[idx])).into());
    }
    let data = DataFrame::new(columns).map_err(|source| OutputError::Frame {
        path: path.to_path_buf(),
        source,
    })?;

    let key = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(CategoryFrame::new(key, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_numbers_without_trailing_zeros() {
        assert_eq!(format_numeric(5.5), "5.5");
        assert_eq!(format_numeric(90.0), "90");
        assert_eq!(format_numeric(0.0), "0");
        assert_eq!(format_numeric(0.02), "0.02");
    }
}
