//! Duration-string conversion.
//!
//! Export sheets store elapsed time as `H:MM:SS` with an unbounded hour
//! field (a week-long total can read `26:05:30`). Time-based categories are
//! converted to total minutes, rounded to 2 decimal places.

use crate::numeric::round2;

/// Convert an `H:MM:SS` duration cell to total minutes (2 dp).
///
/// Returns `None` for empty cells and anything that is not a three-field
/// duration with in-range minutes and seconds.
pub fn parse_duration_minutes(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut fields = trimmed.split(':');
    let hours = fields.next()?.trim().parse::<u64>().ok()?;
    let minutes = fields.next()?.trim().parse::<u64>().ok()?;
    let seconds = fields.next()?.trim().parse::<u64>().ok()?;
    if fields.next().is_some() || minutes >= 60 || seconds >= 60 {
        return None;
    }

    let total_seconds = hours * 3600 + minutes * 60 + seconds;
    Some(round2(total_seconds as f64 / 60.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_minutes() {
        assert_eq!(parse_duration_minutes("0:05:30"), Some(5.5));
        assert_eq!(parse_duration_minutes("1:30:00"), Some(90.0));
        assert_eq!(parse_duration_minutes("0:00:00"), Some(0.0));
    }

    #[test]
    fn hours_are_unbounded() {
        assert_eq!(parse_duration_minutes("26:05:30"), Some(1565.5));
    }

    #[test]
    fn rounds_to_two_places() {
        // 1 second = 0.016666... minutes
        assert_eq!(parse_duration_minutes("0:00:01"), Some(0.02));
    }

    #[test]
    fn rejects_malformed_values() {
        assert_eq!(parse_duration_minutes(""), None);
        assert_eq!(parse_duration_minutes("5.5"), None);
        assert_eq!(parse_duration_minutes("1:75:00"), None);
        assert_eq!(parse_duration_minutes("1:00:99"), None);
        assert_eq!(parse_duration_minutes("1:00:00:00"), None);
        assert_eq!(parse_duration_minutes("abc"), None);
    }
}
