//! Raw sheet representation and reading.

use std::path::Path;

use csv::ReaderBuilder;

use crate::error::IngestError;

/// One export sheet as a generic 2-D labeled table.
///
/// Rows correspond to tracked entities (apps, sites, devices) with summary
/// rows at the tail; columns are one label column, optional metadata
/// columns ("Total Usage", "Device"), then calendar dates. All cells are
/// kept as trimmed strings; typing happens in the transform stage.
#[derive(Debug, Clone)]
pub struct RawSheet {
    /// Sheet name as exported (file stem), e.g. "App - Usage Time".
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawSheet {
    /// Position of a header, if present.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Read one sheet file into a [`RawSheet`].
///
/// The first record is the header row. Cells are trimmed and BOM-stripped;
/// short records are padded with empty cells so every row has one cell per
/// header.
pub fn read_sheet(path: &Path, delimiter: u8) -> Result<RawSheet, IngestError> {
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|source| IngestError::CsvRead {
            path: path.to_path_buf(),
            source,
        })?;

    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|source| IngestError::CsvRead {
            path: path.to_path_buf(),
            source,
        })?;
        if idx == 0 {
            headers = record.iter().map(normalize_cell).collect();
            continue;
        }
        let mut row: Vec<String> = Vec::with_capacity(headers.len());
        for col in 0..headers.len() {
            let value = record.get(col).unwrap_or("");
            row.push(normalize_cell(value));
        }
        if row.iter().all(String::is_empty) {
            continue;
        }
        rows.push(row);
    }

    Ok(RawSheet {
        name,
        headers,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_sheet_with_padding_and_blank_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("App - Usage Time.csv");
        fs::write(
            &path,
            ",Total Usage,6/18/23,6/19/23\nYouTube,2:00:00,1:00:00,1:00:00\nMaps,0:10:00\n,,,\n",
        )
        .unwrap();

        let sheet = read_sheet(&path, b',').unwrap();
        assert_eq!(sheet.name, "App - Usage Time");
        assert_eq!(
            sheet.headers,
            vec!["", "Total Usage", "6/18/23", "6/19/23"]
        );
        assert_eq!(sheet.rows.len(), 2);
        // Short record padded to header width.
        assert_eq!(sheet.rows[1], vec!["Maps", "0:10:00", "", ""]);
        assert_eq!(sheet.column_index("Total Usage"), Some(1));
        assert_eq!(sheet.column_index("Device"), None);
    }
}
