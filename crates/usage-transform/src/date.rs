//! Export date parsing.
//!
//! Date column headers arrive in whatever format the export tool was set
//! to; the formats below cover the exports seen so far. Everything is
//! normalized to ISO `%Y-%m-%d` for the long-format tables.

use chrono::NaiveDate;

/// Candidate formats tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%d-%m-%Y"];

/// Parse a date header or cell, trying each known export format.
pub fn parse_export_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// Format a date for the long-format tables and the output serialization.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
