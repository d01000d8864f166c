//! Cross-batch table merging.
//!
//! Export batches cover different (usually disjoint) date ranges. Tables
//! sharing a category key are outer-unioned on `date`: the result carries
//! the union of dates and the union of entity columns, and a cell with no
//! contributing value becomes zero. "No export row for this entity on this
//! date" means zero activity, not unknown.

use std::collections::{BTreeSet, HashMap};

use polars::prelude::{DataFrame, NamedFrom, Series};

use crate::error::MergeError;
use crate::frame::{CategoryFrame, DATE_COLUMN};

/// One contributing table, indexed for cell lookup.
struct IndexedFrame {
    date_index: HashMap<String, usize>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

fn index_frame(frame: &CategoryFrame) -> Result<IndexedFrame, MergeError> {
    let date_column = frame.data.column(DATE_COLUMN).map_err(|_| {
        MergeError::MissingColumn {
            key: frame.key.to_string(),
            column: DATE_COLUMN.to_string(),
        }
    })?;
    let dates = date_column.str().map_err(|_| MergeError::MissingColumn {
        key: frame.key.to_string(),
        column: DATE_COLUMN.to_string(),
    })?;
    let mut date_index = HashMap::with_capacity(frame.data.height());
    for (idx, date) in dates.into_iter().enumerate() {
        if let Some(date) = date {
            // First occurrence wins for duplicate dates within one table.
            date_index.entry(date.to_string()).or_insert(idx);
        }
    }

    let mut columns = Vec::new();
    for name in frame.data.get_column_names() {
        if name.as_str() == DATE_COLUMN {
            continue;
        }
        let values: Vec<Option<f64>> = frame
            .data
            .column(name)
            .map_err(|source| MergeError::Frame {
                key: frame.key.to_string(),
                source,
            })?
            .f64()
            .map_err(|source| MergeError::Frame {
                key: frame.key.to_string(),
                source,
            })?
            .into_iter()
            .collect();
        columns.push((name.to_string(), values));
    }
    Ok(IndexedFrame {
        date_index,
        columns,
    })
}

/// Outer-union same-category tables on `date`, zero-filling absent cells.
///
/// A single-element input is returned unchanged (there is no absent-cell
/// situation to resolve). When two sources carry a value for the same
/// column on the same date, the earlier batch wins.
///
/// # Errors
///
/// Returns [`MergeError::EmptyMergeSet`] for an empty input list.
pub fn merge_frames(frames: Vec<CategoryFrame>) -> Result<CategoryFrame, MergeError> {
    if frames.is_empty() {
        return Err(MergeError::EmptyMergeSet);
    }
    if frames.len() == 1 {
        return Ok(frames.into_iter().next().expect("one frame"));
    }

    let key = frames[0].key.clone();
    let dropped_duplicates = frames.iter().map(|f| f.dropped_duplicates).sum();
    let indexed: Vec<IndexedFrame> = frames
        .iter()
        .map(index_frame)
        .collect::<Result<_, _>>()?;

    // Union of dates, ascending; union of columns in first-seen order.
    let dates: Vec<String> = indexed
        .iter()
        .flat_map(|frame| frame.date_index.keys().cloned())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();
    let mut column_names: Vec<String> = Vec::new();
    for frame in &indexed {
        for (name, _) in &frame.columns {
            if !column_names.iter().any(|existing| existing == name) {
                column_names.push(name.clone());
            }
        }
    }

    let mut columns = vec![Series::new(DATE_COLUMN.into(), dates.clone()).into()];
    for name in &column_names {
        let values: Vec<f64> = dates
            .iter()
            .map(|date| cell_value(&indexed, name, date).unwrap_or(0.0))
            .collect();
        columns.push(Series::new(name.as_str().into(), values).into());
    }

    let data = DataFrame::new(columns).map_err(|source| MergeError::Frame {
        key: key.to_string(),
        source,
    })?;
    Ok(CategoryFrame {
        key,
        data,
        dropped_duplicates,
    })
}

/// First non-missing contribution for a (column, date) cell, scanning
/// batches in input order.
fn cell_value(indexed: &[IndexedFrame], column: &str, date: &str) -> Option<f64> {
    for frame in indexed {
        let Some(row) = frame.date_index.get(date) else {
            continue;
        };
        for (name, values) in &frame.columns {
            if name == column {
                if let Some(value) = values.get(*row).copied().flatten() {
                    return Some(value);
                }
            }
        }
    }
    None
}

/// Row-wise concatenation of the `[date, unlock_column]` slice of unlock
/// tables from multiple batches.
///
/// Unlock exports carry a single tracked column; batches cover disjoint
/// ranges, so stacking rows (rather than joining) preserves every reading.
///
/// # Errors
///
/// Returns [`MergeError::EmptyMergeSet`] for an empty input and
/// [`MergeError::MissingColumn`] when a contributing table lacks the
/// unlock column.
pub fn concat_unlock_frames(
    frames: &[CategoryFrame],
    unlock_column: &str,
) -> Result<CategoryFrame, MergeError> {
    let first = frames.first().ok_or(MergeError::EmptyMergeSet)?;
    let key = first.key.clone();

    let mut dates: Vec<String> = Vec::new();
    let mut values: Vec<Option<f64>> = Vec::new();
    for frame in frames {
        let date_column = frame.data.column(DATE_COLUMN).map_err(|_| {
            MergeError::MissingColumn {
                key: frame.key.to_string(),
                column: DATE_COLUMN.to_string(),
            }
        })?;
        let frame_dates = date_column.str().map_err(|_| MergeError::MissingColumn {
            key: frame.key.to_string(),
            column: DATE_COLUMN.to_string(),
        })?;
        let unlock_col = frame.data.column(unlock_column).map_err(|_| {
            MergeError::MissingColumn {
                key: frame.key.to_string(),
                column: unlock_column.to_string(),
            }
        })?;
        let unlocks = unlock_col.f64().map_err(|_| MergeError::MissingColumn {
            key: frame.key.to_string(),
            column: unlock_column.to_string(),
        })?;
        for (date, value) in frame_dates.into_iter().zip(unlocks.into_iter()) {
            if let Some(date) = date {
                dates.push(date.to_string());
                values.push(value);
            }
        }
    }

    let data = DataFrame::new(vec![
        Series::new(DATE_COLUMN.into(), dates).into(),
        Series::new(unlock_column.into(), values).into(),
    ])
    .map_err(|source| MergeError::Frame {
        key: key.to_string(),
        source,
    })?;
    Ok(CategoryFrame {
        key,
        data,
        dropped_duplicates: frames.iter().map(|f| f.dropped_duplicates).sum(),
    })
}
