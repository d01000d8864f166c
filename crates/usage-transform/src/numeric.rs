//! Numeric parsing and rounding helpers.

/// Parses a string as f64, returning None for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    if value.trim().is_empty() {
        return None;
    }
    value.trim().parse::<f64>().ok()
}

/// Rounds to 2 decimal places, the precision usage values are stored at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
