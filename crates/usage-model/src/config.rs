//! Run configuration for the usage pipeline.
//!
//! Every knob the pipeline exposes lives here: the activity threshold for
//! column filtering, the gap-fill policy and its per-category allow-lists,
//! the excluded-date set, and the device vocabulary aliases. Defaults mirror
//! the tracked phone setup the exports come from; a JSON file supplied via
//! `--config` overrides them.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How missing values are repaired after resampling to daily cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPolicy {
    /// Fill gaps with the column-wise mean over the whole table.
    #[default]
    Mean,
    /// Propagate the most recent prior day's value forward.
    ForwardFill,
    /// Resample only; leave genuine gaps as missing.
    None,
}

/// Configuration for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum column-wise sum for an entity column to survive filtering.
    pub activity_threshold: i64,

    /// Fill policy applied to gap-filled categories.
    pub fill_policy: FillPolicy,

    /// Categories whose daily gaps are repaired. Everything else is
    /// resampled but left with genuine gaps.
    pub gap_fill_categories: Vec<String>,

    /// Categories where a recorded `0` means "no reading", not "zero
    /// activity", and is treated as missing before filling.
    pub zero_as_missing_categories: Vec<String>,

    /// Dates dropped before resampling (known bad records at the source).
    pub excluded_dates: Vec<NaiveDate>,

    /// Vocabulary aliases applied during key normalization, mapping an
    /// export token to a canonical one (e.g. a phone-model suffix to a
    /// generic device name).
    pub device_aliases: BTreeMap<String, String>,

    /// Device label assumed for sheets that carry no per-row device tag.
    pub default_device: String,

    /// Header of the unlock-count column in device sheets.
    pub unlock_column: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            activity_threshold: 100,
            fill_policy: FillPolicy::Mean,
            gap_fill_categories: vec![
                "app_usage_time_motorola".to_string(),
                "app_usage_count_motorola".to_string(),
                "device_unlocks_motorola".to_string(),
            ],
            zero_as_missing_categories: vec!["device_unlocks_motorola".to_string()],
            excluded_dates: vec![NaiveDate::from_ymd_opt(2023, 6, 25).expect("valid date")],
            device_aliases: BTreeMap::from([
                ("plus".to_string(), "motorola".to_string()),
                ("extension".to_string(), "chrome".to_string()),
            ]),
            default_device: "motorola".to_string(),
            unlock_column: "Device Unlocks".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file. Missing fields fall back to the
    /// defaults above.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Whether the category's gaps should be repaired (vs resample-only).
    pub fn should_gap_fill(&self, key: &str) -> bool {
        self.gap_fill_categories.iter().any(|c| c == key)
    }

    /// Whether recorded zeros in this category are sensor gaps.
    pub fn zero_is_missing(&self, key: &str) -> bool {
        self.zero_as_missing_categories.iter().any(|c| c == key)
    }
}
