//! Daily resampling and gap repair.
//!
//! Every table leaving the pipeline covers each calendar day between its
//! first and last observation exactly once. Known-bad dates are dropped
//! first; days with no source record are inserted as missing and repaired
//! according to the category's fill policy.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use polars::prelude::{DataFrame, NamedFrom, Series};
use tracing::debug;

use usage_model::FillPolicy;

use crate::date::{format_date, parse_export_date};
use crate::error::GapFillError;
use crate::frame::{CategoryFrame, DATE_COLUMN};
use crate::numeric::round2;

/// Per-category gap-fill behavior.
#[derive(Debug, Clone, Default)]
pub struct GapFillOptions {
    /// Dates dropped before resampling (known bad records).
    pub excluded_dates: Vec<NaiveDate>,
    /// How missing values are repaired after resampling.
    pub policy: FillPolicy,
    /// Treat recorded zeros as "no reading" rather than zero activity.
    pub zero_as_missing: bool,
}

/// Resample a table to strict daily cadence and repair gaps.
///
/// The output is sorted ascending by `date`, with one row per calendar day
/// between the observed minimum and maximum date inclusive, no duplicates.
/// Duplicate source dates keep their first occurrence.
///
/// # Errors
///
/// Returns [`GapFillError::EmptyRange`] when no rows remain to resample
/// (the table was empty, or every row was excluded).
pub fn fill_date_gaps(
    frame: &CategoryFrame,
    options: &GapFillOptions,
) -> Result<CategoryFrame, GapFillError> {
    let key = frame.key.to_string();
    let date_column = frame
        .data
        .column(DATE_COLUMN)
        .map_err(|_| GapFillError::MissingDateColumn { key: key.clone() })?;
    let dates = date_column
        .str()
        .map_err(|_| GapFillError::MissingDateColumn { key: key.clone() })?;

    // Source row index per date, first occurrence kept, exclusions dropped.
    let mut by_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for (idx, raw) in dates.into_iter().enumerate() {
        let raw = raw.unwrap_or("");
        let date = parse_export_date(raw).ok_or_else(|| GapFillError::BadDate {
            key: key.clone(),
            value: raw.to_string(),
        })?;
        if options.excluded_dates.contains(&date) {
            debug!(key = %key, date = %date, "dropping excluded date");
            continue;
        }
        by_date.entry(date).or_insert(idx);
    }

    let (&min_date, _) = by_date
        .first_key_value()
        .ok_or(GapFillError::EmptyRange { key: key.clone() })?;
    let (&max_date, _) = by_date.last_key_value().expect("non-empty map");

    let calendar = daily_range(min_date, max_date);
    let day_count = calendar.len();

    let mut columns =
        vec![
            Series::new(DATE_COLUMN.into(), calendar.iter().copied().map(format_date).collect::<Vec<_>>())
                .into(),
        ];
    for name in frame.data.get_column_names() {
        if name.as_str() == DATE_COLUMN {
            continue;
        }
        let source: Vec<Option<f64>> = frame
            .data
            .column(name)
            .map_err(|source| GapFillError::Frame {
                key: key.clone(),
                source,
            })?
            .f64()
            .map_err(|source| GapFillError::Frame {
                key: key.clone(),
                source,
            })?
            .into_iter()
            .collect();

        let mut values: Vec<Option<f64>> = Vec::with_capacity(day_count);
        for day in &calendar {
            let value = by_date.get(day).and_then(|&idx| source.get(idx).copied().flatten());
            values.push(value);
        }
        if options.zero_as_missing {
            for value in &mut values {
                if *value == Some(0.0) {
                    *value = None;
                }
            }
        }
        apply_policy(&mut values, options.policy);
        columns.push(Series::new(name.as_str().into(), values).into());
    }

    let data = DataFrame::new(columns).map_err(|source| GapFillError::Frame {
        key: key.clone(),
        source,
    })?;
    Ok(CategoryFrame {
        key: frame.key.clone(),
        data,
        dropped_duplicates: frame.dropped_duplicates,
    })
}

/// Every calendar day from `min` to `max` inclusive.
fn daily_range(min: NaiveDate, max: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut day = min;
    while day <= max {
        days.push(day);
        let Some(next) = day.succ_opt() else {
            break;
        };
        day = next;
    }
    days
}

fn apply_policy(values: &mut [Option<f64>], policy: FillPolicy) {
    match policy {
        FillPolicy::None => {}
        FillPolicy::ForwardFill => {
            let mut last = None;
            for value in values.iter_mut() {
                match *value {
                    Some(current) => last = Some(current),
                    // Days before the first observation stay missing.
                    None => *value = last,
                }
            }
        }
        FillPolicy::Mean => {
            let observed: Vec<f64> = values.iter().copied().flatten().collect();
            if observed.is_empty() {
                return;
            }
            let mean = round2(observed.iter().sum::<f64>() / observed.len() as f64);
            for value in values.iter_mut() {
                if value.is_none() {
                    *value = Some(mean);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(key: &str, dates: &[&str], columns: &[(&str, &[Option<f64>])]) -> CategoryFrame {
        let mut series = vec![Series::new(DATE_COLUMN.into(), dates.to_vec()).into()];
        for (name, values) in columns {
            series.push(Series::new((*name).into(), values.to_vec()).into());
        }
        CategoryFrame::new(key, DataFrame::new(series).unwrap())
    }

    fn dates_of(frame: &CategoryFrame) -> Vec<String> {
        frame
            .data
            .column(DATE_COLUMN)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|d| d.unwrap().to_string())
            .collect()
    }

    fn column_values(frame: &CategoryFrame, name: &str) -> Vec<Option<f64>> {
        frame
            .data
            .column(name)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn resamples_to_contiguous_daily_index() {
        let input = frame(
            "app_usage_time_motorola",
            &["2023-01-04", "2023-01-01"],
            &[("appA", &[Some(40.0), Some(10.0)])],
        );
        let filled = fill_date_gaps(&input, &GapFillOptions::default()).unwrap();
        assert_eq!(
            dates_of(&filled),
            vec!["2023-01-01", "2023-01-02", "2023-01-03", "2023-01-04"]
        );
        // Mean of the two observations is 25.
        assert_eq!(
            column_values(&filled, "appA"),
            vec![Some(10.0), Some(25.0), Some(25.0), Some(40.0)]
        );
    }

    #[test]
    fn forward_fill_carries_last_observation() {
        let input = frame(
            "app_usage_time_motorola",
            &["2023-01-01", "2023-01-03"],
            &[("appA", &[Some(10.0), Some(30.0)])],
        );
        let options = GapFillOptions {
            policy: FillPolicy::ForwardFill,
            ..GapFillOptions::default()
        };
        let filled = fill_date_gaps(&input, &options).unwrap();
        assert_eq!(
            column_values(&filled, "appA"),
            vec![Some(10.0), Some(10.0), Some(30.0)]
        );
    }

    #[test]
    fn policy_none_keeps_gaps() {
        let input = frame(
            "web_usage_time_chrome",
            &["2023-01-01", "2023-01-03"],
            &[("siteA", &[Some(10.0), Some(30.0)])],
        );
        let options = GapFillOptions {
            policy: FillPolicy::None,
            ..GapFillOptions::default()
        };
        let filled = fill_date_gaps(&input, &options).unwrap();
        assert_eq!(
            column_values(&filled, "siteA"),
            vec![Some(10.0), None, Some(30.0)]
        );
    }

    #[test]
    fn recorded_zero_is_missing_for_unlock_counts() {
        let input = frame(
            "device_unlocks_motorola",
            &["2023-01-01", "2023-01-02", "2023-01-03"],
            &[("Device Unlocks", &[Some(40.0), Some(0.0), Some(60.0)])],
        );
        let options = GapFillOptions {
            zero_as_missing: true,
            policy: FillPolicy::Mean,
            ..GapFillOptions::default()
        };
        let filled = fill_date_gaps(&input, &options).unwrap();
        // The zero reading is replaced by the mean of the real readings.
        assert_eq!(
            column_values(&filled, "Device Unlocks"),
            vec![Some(40.0), Some(50.0), Some(60.0)]
        );
    }

    #[test]
    fn excluded_dates_are_dropped_before_resampling() {
        let input = frame(
            "app_usage_time_motorola",
            &["2023-06-24", "2023-06-25", "2023-06-26"],
            &[("appA", &[Some(10.0), Some(999.0), Some(30.0)])],
        );
        let options = GapFillOptions {
            excluded_dates: vec![NaiveDate::from_ymd_opt(2023, 6, 25).unwrap()],
            policy: FillPolicy::Mean,
            ..GapFillOptions::default()
        };
        let filled = fill_date_gaps(&input, &options).unwrap();
        // The bad record no longer contributes; its day is re-imputed.
        assert_eq!(
            column_values(&filled, "appA"),
            vec![Some(10.0), Some(20.0), Some(30.0)]
        );
    }

    #[test]
    fn duplicate_dates_keep_first_occurrence() {
        let input = frame(
            "app_usage_time_motorola",
            &["2023-01-01", "2023-01-01"],
            &[("appA", &[Some(10.0), Some(99.0)])],
        );
        let filled = fill_date_gaps(&input, &GapFillOptions::default()).unwrap();
        assert_eq!(dates_of(&filled), vec!["2023-01-01"]);
        assert_eq!(column_values(&filled, "appA"), vec![Some(10.0)]);
    }

    #[test]
    fn empty_table_is_an_error() {
        let input = frame("app_usage_time_motorola", &[], &[("appA", &[])]);
        assert!(matches!(
            fill_date_gaps(&input, &GapFillOptions::default()),
            Err(GapFillError::EmptyRange { .. })
        ));
    }
}
