//! Integration test: two export batches through every pipeline stage.

use std::fs;
use std::path::Path;

use usage_cli::pipeline::{
    filter_stage, impute_stage, output_stage, reshape_stage, unify_stage,
};
use usage_model::PipelineConfig;
use usage_output::read_frame;
use usage_transform::{CategoryFrame, DATE_COLUMN};

fn write_batch_one(dir: &Path) {
    fs::write(
        dir.join("App - Usage Time.csv"),
        ",Total Usage,6/18/23,6/19/23\n\
         YouTube,3:00:00,1:00:00,2:00:00\n\
         Maps,0:03:00,0:02:00,0:01:00\n\
         Total,3:03:00,1:02:00,2:01:00\n\
         Daily Average,1:31:30,1:02:00,2:01:00\n\
         Days Tracked,2,1,1\n\
         Exported using StayFree,,,\n",
    )
    .unwrap();
    fs::write(
        dir.join("Device Unlocks.csv"),
        ",Total Usage,6/18/23,6/19/23\n\
         Device Unlocks,90,40,50\n\
         Total,90,40,50\n\
         Daily Average,45,40,50\n\
         Days Tracked,2,1,1\n\
         Exported using StayFree,,,\n",
    )
    .unwrap();
}

fn write_batch_two(dir: &Path) {
    fs::write(
        dir.join("App - Usage Time.csv"),
        ",Total Usage,6/21/23\n\
         YouTube,0:30:00,0:30:00\n\
         Total,0:30:00,0:30:00\n\
         Daily Average,0:30:00,0:30:00\n\
         Days Tracked,1,1\n\
         Exported using StayFree,,\n",
    )
    .unwrap();
    fs::write(
        dir.join("Device Unlocks.csv"),
        ",Total Usage,6/21/23\n\
         Device Unlocks,0,0\n\
         Total,0,0\n\
         Daily Average,0,0\n\
         Days Tracked,1,1\n\
         Exported using StayFree,,\n",
    )
    .unwrap();
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
fn two_batches_produce_daily_tables() {
    let input = tempfile::tempdir().unwrap();
    let batch_one = input.path().join("export-2023-06");
    let batch_two = input.path().join("export-2023-07");
    fs::create_dir(&batch_one).unwrap();
    fs::create_dir(&batch_two).unwrap();
    write_batch_one(&batch_one);
    write_batch_two(&batch_two);

    let config = PipelineConfig {
        activity_threshold: 10,
        ..PipelineConfig::default()
    };
    let output_dir = input.path().join("processed");

    let reshaped = reshape_stage(input.path(), &config).unwrap();
    assert_eq!(reshaped.batches, 2);
    assert_eq!(reshaped.sheets, 4);
    assert_eq!(
        reshaped.groups.keys().collect::<Vec<_>>(),
        vec!["app_usage_time_motorola", "device_unlocks_motorola"]
    );

    let mut groups = reshaped.groups;
    filter_stage(&mut groups, config.activity_threshold).unwrap();
    let unified = unify_stage(groups, &config).unwrap();
    let imputed = impute_stage(unified, &config).unwrap();
    let paths = output_stage(&imputed, &output_dir).unwrap();
    assert_eq!(paths.len(), 2);

    // App usage: Maps fell below the threshold; the 6/20 gap got the mean.
    let app = read_frame(&output_dir.join("app_usage_time_motorola.csv")).unwrap();
    assert_eq!(
        dates_of(&app),
        vec!["2023-06-18", "2023-06-19", "2023-06-20", "2023-06-21"]
    );
    assert_eq!(app.entity_columns(), vec!["YouTube"]);
    assert_eq!(
        column_values(&app, "YouTube"),
        vec![Some(60.0), Some(120.0), Some(70.0), Some(30.0)]
    );

    // Unlock counts: batches concatenated; the recorded 0 on 6/21 and the
    // 6/20 gap are both repaired with the mean of the real readings.
    let unlocks = read_frame(&output_dir.join("device_unlocks_motorola.csv")).unwrap();
    assert_eq!(
        dates_of(&unlocks),
        vec!["2023-06-18", "2023-06-19", "2023-06-20", "2023-06-21"]
    );
    assert_eq!(
        column_values(&unlocks, "Device Unlocks"),
        vec![Some(40.0), Some(50.0), Some(45.0), Some(45.0)]
    );
}

#[test]
fn single_flat_batch_still_runs() {
    let input = tempfile::tempdir().unwrap();
    write_batch_one(input.path());

    let config = PipelineConfig {
        activity_threshold: 10,
        ..PipelineConfig::default()
    };
    let reshaped = reshape_stage(input.path(), &config).unwrap();
    assert_eq!(reshaped.batches, 1);

    let mut groups = reshaped.groups;
    filter_stage(&mut groups, config.activity_threshold).unwrap();
    let unified = unify_stage(groups, &config).unwrap();
    let imputed = impute_stage(unified, &config).unwrap();

    let app = imputed
        .iter()
        .find(|c| c.frame.key.as_str() == "app_usage_time_motorola")
        .unwrap();
    assert!(app.gap_filled);
    assert_eq!(dates_of(&app.frame), vec!["2023-06-18", "2023-06-19"]);
}
