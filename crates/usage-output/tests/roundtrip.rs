//! Write/read round-trip tests for the delimited output format.

use polars::prelude::{DataFrame, NamedFrom, Series};

use usage_output::{read_frame, write_frame};
use usage_transform::{CategoryFrame, DATE_COLUMN};

fn sample_frame() -> CategoryFrame {
    let data = DataFrame::new(vec![
        Series::new(DATE_COLUMN.into(), vec!["2023-06-18", "2023-06-19", "2023-06-20"]).into(),
        Series::new("YouTube".into(), vec![Some(60.0), Some(5.5), Some(0.02)]).into(),
        Series::new("Maps".into(), vec![Some(0.0), None, Some(12.25)]).into(),
    ])
    .unwrap();
    CategoryFrame::new("app_usage_time_motorola", data)
}

#[test]
fn written_tables_read_back_equal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app_usage_time_motorola.csv");

    let frame = sample_frame();
    write_frame(&frame, &path).unwrap();
    let reloaded = read_frame(&path).unwrap();

    assert_eq!(reloaded.key.as_str(), "app_usage_time_motorola");
    assert_eq!(reloaded.data, frame.data);
}

#[test]
fn output_is_semicolon_delimited_with_iso_dates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.csv");
    write_frame(&sample_frame(), &path).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let mut lines = raw.lines();
    assert_eq!(lines.next(), Some("date;YouTube;Maps"));
    assert_eq!(lines.next(), Some("2023-06-18;60;0"));
    assert_eq!(lines.next(), Some("2023-06-19;5.5;"));
    assert_eq!(lines.next(), Some("2023-06-20;0.02;12.25"));
}

#[test]
fn files_without_a_date_column_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "day;count\n2023-01-01;4\n").unwrap();
    assert!(read_frame(&path).is_err());
}
