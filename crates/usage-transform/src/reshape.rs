//! Wide-to-long sheet reshaping.
//!
//! Converts one wide export sheet (entities as rows, dates as columns) into
//! long, date-keyed tables, one per device × category group. Duplicate
//! entity labels keep their first occurrence; time-based cells are
//! converted from `H:MM:SS` to minutes.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::{DataFrame, NamedFrom, Series};
use tracing::{debug, warn};

use usage_ingest::RawSheet;
use usage_model::{MeasureKind, SheetKind};

use crate::date::{format_date, parse_export_date};
use crate::duration::parse_duration_minutes;
use crate::error::{MalformedSheetError, ReshapeError};
use crate::frame::{CategoryFrame, DATE_COLUMN};
use crate::key::category_key;
use crate::numeric::parse_f64;

/// Aggregate/summary rows the export appends to every sheet.
const TRAILER_ROWS: usize = 4;

/// Running-total column present on every sheet, never carried forward.
const TOTAL_USAGE_COLUMN: &str = "Total Usage";

/// Per-row device tag on multi-device sheets.
const DEVICE_COLUMN: &str = "Device";

/// Caller-supplied knobs for reshaping.
#[derive(Debug, Clone)]
pub struct ReshapeOptions<'a> {
    /// Vocabulary aliases applied to device tokens.
    pub aliases: &'a BTreeMap<String, String>,
    /// Device label assumed for sheets without a per-row device tag.
    pub default_device: &'a str,
}

/// Reshape one wide sheet into long, date-keyed tables.
///
/// Returns one [`CategoryFrame`] per device group (a single frame for
/// sheets without a per-row device tag), keyed by the normalized
/// sheet × device label.
pub fn reshape_sheet(
    sheet: &RawSheet,
    kind: SheetKind,
    measure: MeasureKind,
    options: &ReshapeOptions<'_>,
) -> Result<Vec<CategoryFrame>, ReshapeError> {
    let total_idx =
        sheet
            .column_index(TOTAL_USAGE_COLUMN)
            .ok_or(MalformedSheetError::MissingColumn {
                sheet: sheet.name.clone(),
                column: TOTAL_USAGE_COLUMN,
            })?;
    let device_idx = sheet.column_index(DEVICE_COLUMN);
    if kind.has_device_column() && device_idx.is_none() {
        return Err(MalformedSheetError::MissingColumn {
            sheet: sheet.name.clone(),
            column: DEVICE_COLUMN,
        }
        .into());
    }

    // Remaining headers are calendar dates; anything else is ignored.
    let mut date_columns: Vec<(usize, String)> = Vec::new();
    for (idx, header) in sheet.headers.iter().enumerate() {
        if idx == 0 || idx == total_idx || Some(idx) == device_idx {
            continue;
        }
        match parse_export_date(header) {
            Some(date) => date_columns.push((idx, format_date(date))),
            None => debug!(sheet = %sheet.name, column = %header, "ignoring non-date column"),
        }
    }
    if date_columns.is_empty() {
        return Err(MalformedSheetError::NoDateColumns {
            sheet: sheet.name.clone(),
        }
        .into());
    }

    if sheet.rows.len() <= TRAILER_ROWS {
        return Err(MalformedSheetError::TooFewRows {
            sheet: sheet.name.clone(),
            rows: sheet.rows.len(),
            trailer: TRAILER_ROWS,
        }
        .into());
    }
    let data_rows = &sheet.rows[..sheet.rows.len() - TRAILER_ROWS];

    let mut groups: BTreeMap<String, Vec<&Vec<String>>> = BTreeMap::new();
    match device_idx.filter(|_| kind.has_device_column()) {
        Some(device_idx) => {
            for row in data_rows {
                let device = row
                    .get(device_idx)
                    .map(String::as_str)
                    .unwrap_or("")
                    .to_string();
                groups.entry(device).or_default().push(row);
            }
        }
        None => {
            groups.insert(options.default_device.to_string(), data_rows.iter().collect());
        }
    }

    let mut frames = Vec::with_capacity(groups.len());
    for (raw_device, rows) in groups {
        let key = category_key(&sheet.name, &raw_device, options.aliases);
        frames.push(reshape_group(&key, &rows, &date_columns, measure)?);
    }
    Ok(frames)
}

/// Transpose one device group: dates become the leading column, entity
/// labels become column headers.
fn reshape_group(
    key: &str,
    rows: &[&Vec<String>],
    date_columns: &[(usize, String)],
    measure: MeasureKind,
) -> Result<CategoryFrame, ReshapeError> {
    let dates: Vec<String> = date_columns.iter().map(|(_, iso)| iso.clone()).collect();
    let mut columns = vec![Series::new(DATE_COLUMN.into(), dates).into()];

    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut dropped = 0usize;
    for row in rows {
        let label = row.first().map(String::as_str).unwrap_or("");
        if label.is_empty() {
            debug!(key = %key, "skipping row with empty entity label");
            continue;
        }
        // Keep the first occurrence of a label; a row named like the date
        // column would collide with it and is dropped the same way.
        if label == DATE_COLUMN || !seen.insert(label.to_string()) {
            dropped += 1;
            continue;
        }
        let values: Vec<Option<f64>> = date_columns
            .iter()
            .map(|(idx, _)| {
                let cell = row.get(*idx).map(String::as_str).unwrap_or("");
                match measure {
                    MeasureKind::Duration => parse_duration_minutes(cell),
                    MeasureKind::Count => parse_f64(cell),
                }
            })
            .collect();
        columns.push(Series::new(label.into(), values).into());
    }

    if dropped > 0 {
        warn!(key = %key, dropped, "dropped duplicate entity columns (first occurrence kept)");
    }
    let data = DataFrame::new(columns).map_err(|source| ReshapeError::Frame {
        key: key.to_string(),
        source,
    })?;
    Ok(CategoryFrame {
        key: key.to_string().into(),
        data,
        dropped_duplicates: dropped,
    })
}
