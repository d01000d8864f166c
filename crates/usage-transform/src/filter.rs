//! Low-signal column filtering.

use polars::prelude::PolarsError;
use tracing::debug;

use crate::frame::{CategoryFrame, DATE_COLUMN};

/// Drop entity columns whose total activity over the whole observed period
/// falls below `threshold`.
///
/// The `date` column is always retained and always leads the output;
/// surviving entity columns keep their relative order. The input frame is
/// not mutated. Filtering an already-filtered table with the same
/// threshold is a no-op.
pub fn filter_columns(
    frame: &CategoryFrame,
    threshold: i64,
) -> Result<CategoryFrame, PolarsError> {
    let mut selection: Vec<String> = vec![DATE_COLUMN.to_string()];
    for name in frame.data.get_column_names() {
        if name.as_str() == DATE_COLUMN {
            continue;
        }
        let column = frame.data.column(name)?;
        let sum: f64 = match column.f64() {
            Ok(values) => values.into_iter().flatten().sum(),
            // Non-numeric columns carry no activity signal.
            Err(_) => 0.0,
        };
        if sum >= threshold as f64 {
            selection.push(name.to_string());
        } else {
            debug!(key = %frame.key, column = %name, sum, threshold, "dropping low-signal column");
        }
    }

    let data = frame.data.select(selection)?;
    Ok(CategoryFrame {
        key: frame.key.clone(),
        data,
        dropped_duplicates: frame.dropped_duplicates,
    })
}
