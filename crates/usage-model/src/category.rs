//! Category and sheet classification types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized identifier for one tracked category, e.g.
/// `app_usage_time_motorola` or `web_usage_count_chrome`.
///
/// Keys are produced by the reshape stage from sheet and device labels and
/// are the unit of grouping for merge, gap-fill, and output file naming.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryKey(String);

impl CategoryKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CategoryKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What a sheet's cells measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureKind {
    /// Elapsed time, exported as `H:MM:SS` strings. Converted to minutes.
    Duration,
    /// Plain counts (launches, visits, unlocks). Kept numeric as-is.
    Count,
}

impl MeasureKind {
    /// Classify from a sheet name. Export sheets carrying elapsed time
    /// always have "Time" in the name ("App - Usage Time", "Web - Usage
    /// Time"); everything else is a count.
    pub fn from_sheet_name(name: &str) -> Self {
        if name.contains("Time") {
            Self::Duration
        } else {
            Self::Count
        }
    }
}

/// Structural shape of an export sheet.
///
/// Web sheets carry one row per site per device and must be split by the
/// "Device" column before transposing; app and unlock sheets describe a
/// single device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetKind {
    App,
    Web,
    DeviceUnlocks,
}

impl SheetKind {
    /// Classify a sheet by its exported name. Returns `None` for sheets the
    /// pipeline does not process.
    pub fn from_sheet_name(name: &str) -> Option<Self> {
        if name.contains("Web") {
            Some(Self::Web)
        } else if name.contains("App") {
            Some(Self::App)
        } else if name.contains("Device") {
            Some(Self::DeviceUnlocks)
        } else {
            None
        }
    }

    /// Whether rows are tagged with their originating device.
    pub fn has_device_column(self) -> bool {
        matches!(self, Self::Web)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_kind_classification() {
        assert_eq!(
            SheetKind::from_sheet_name("App - Usage Time"),
            Some(SheetKind::App)
        );
        assert_eq!(
            SheetKind::from_sheet_name("Web - Usage Count"),
            Some(SheetKind::Web)
        );
        assert_eq!(
            SheetKind::from_sheet_name("Device Unlocks"),
            Some(SheetKind::DeviceUnlocks)
        );
        assert_eq!(SheetKind::from_sheet_name("Notes"), None);
    }

    #[test]
    fn measure_kind_classification() {
        assert_eq!(
            MeasureKind::from_sheet_name("App - Usage Time"),
            MeasureKind::Duration
        );
        assert_eq!(
            MeasureKind::from_sheet_name("App - Usage Count"),
            MeasureKind::Count
        );
        assert_eq!(
            MeasureKind::from_sheet_name("Device Unlocks"),
            MeasureKind::Count
        );
    }

    #[test]
    fn category_key_display() {
        let key = CategoryKey::new("app_usage_time_motorola");
        assert_eq!(key.to_string(), "app_usage_time_motorola");
        assert_eq!(key.as_str(), "app_usage_time_motorola");
    }
}
