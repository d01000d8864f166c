//! Category frame type passed between pipeline stages.

use polars::prelude::DataFrame;

use usage_model::CategoryKey;

/// Name of the date column every long-format table carries.
pub const DATE_COLUMN: &str = "date";

/// A long-format usage table for one category.
///
/// Wraps a Polars DataFrame with the normalized category key and the count
/// of duplicate entity columns discarded during reshaping. The frame always
/// has `date` as its first column; every other column is one tracked entity.
#[derive(Debug, Clone)]
pub struct CategoryFrame {
    /// Normalized category key, e.g. `app_usage_time_motorola`.
    pub key: CategoryKey,
    /// The table contents.
    pub data: DataFrame,
    /// Duplicate entity columns dropped while reshaping (first kept).
    pub dropped_duplicates: usize,
}

impl CategoryFrame {
    pub fn new(key: impl Into<CategoryKey>, data: DataFrame) -> Self {
        Self {
            key: key.into(),
            data,
            dropped_duplicates: 0,
        }
    }

    /// Number of date rows in the table.
    pub fn record_count(&self) -> usize {
        self.data.height()
    }

    /// Entity column labels, in table order, excluding `date`.
    pub fn entity_columns(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .iter()
            .filter(|name| name.as_str() != DATE_COLUMN)
            .map(|name| name.to_string())
            .collect()
    }
}
