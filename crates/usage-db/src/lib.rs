//! Bulk loader for processed usage tables.
//!
//! Loads a directory of semicolon-delimited output files into a SQLite
//! database, one table per file. Load semantics are "replace existing
//! table": the table is dropped and recreated on every run, with no
//! incremental append and no schema migration. Column names are derived
//! from the file headers (lower-case, spaces to underscores); the `date`
//! column is declared `DATE`, everything else `REAL`.

use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use rusqlite::{Connection, params_from_iter, types::Value};
use thiserror::Error;
use tracing::info;

/// Delimiter of the processed output files.
const DELIMITER: u8 = b';';

/// Errors specific to database loading.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("file {path} has no header row")]
    EmptyHeader { path: PathBuf },
}

/// One table created by a load run.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: String,
    pub rows: usize,
}

/// Normalize a header into a SQL column name: lower-case, spaces to
/// underscores.
pub fn normalize_column_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Load every `*.csv` file in `dir` into the database at `db_path`,
/// replacing any existing table of the same name.
pub fn load_directory(db_path: &Path, dir: &Path) -> Result<Vec<LoadedTable>, DbError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|source| DbError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();

    let mut conn = Connection::open(db_path)?;
    let mut loaded = Vec::with_capacity(files.len());
    for file in files {
        loaded.push(load_file(&mut conn, &file)?);
    }
    Ok(loaded)
}

/// Load one delimited file as a table named after its stem.
pub fn load_file(conn: &mut Connection, path: &Path) -> Result<LoadedTable, DbError> {
    let table = path
        .file_stem()
        .map(|stem| normalize_column_name(&stem.to_string_lossy()))
        .unwrap_or_default();

    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .from_path(path)
        .map_err(|source| DbError::CsvRead {
            path: path.to_path_buf(),
            source,
        })?;
    let columns: Vec<String> = reader
        .headers()
        .map_err(|source| DbError::CsvRead {
            path: path.to_path_buf(),
            source,
        })?
        .iter()
        .map(normalize_column_name)
        .collect();
    if columns.is_empty() {
        return Err(DbError::EmptyHeader {
            path: path.to_path_buf(),
        });
    }

    let column_defs: Vec<String> = columns
        .iter()
        .map(|name| {
            if name == "date" {
                format!("\"{name}\" DATE")
            } else {
                format!("\"{name}\" REAL")
            }
        })
        .collect();
    conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS \"{table}\";\nCREATE TABLE \"{table}\" ({});",
        column_defs.join(", ")
    ))?;

    let placeholders = vec!["?"; columns.len()].join(", ");
    let quoted: Vec<String> = columns.iter().map(|name| format!("\"{name}\"")).collect();
    let insert = format!(
        "INSERT INTO \"{table}\" ({}) VALUES ({placeholders})",
        quoted.join(", ")
    );

    let tx = conn.transaction()?;
    let mut rows = 0usize;
    {
        let mut statement = tx.prepare(&insert)?;
        for record in reader.records() {
            let record = record.map_err(|source| DbError::CsvRead {
                path: path.to_path_buf(),
                source,
            })?;
            let values: Vec<Value> = columns
                .iter()
                .enumerate()
                .map(|(idx, name)| {
                    let cell = record.get(idx).unwrap_or("").trim();
                    if cell.is_empty() {
                        Value::Null
                    } else if name == "date" {
                        Value::Text(cell.to_string())
                    } else {
                        match cell.parse::<f64>() {
                            Ok(number) => Value::Real(number),
                            Err(_) => Value::Text(cell.to_string()),
                        }
                    }
                })
                .collect();
            statement.execute(params_from_iter(values))?;
            rows += 1;
        }
    }
    tx.commit()?;

    info!(table = %table, rows, "loaded table");
    Ok(LoadedTable { table, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_column_names() {
        assert_eq!(normalize_column_name("Device Unlocks"), "device_unlocks");
        assert_eq!(normalize_column_name(" date "), "date");
        assert_eq!(normalize_column_name("YouTube"), "youtube");
    }

    #[test]
    fn loads_and_replaces_tables() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("app_usage_time_motorola.csv");
        std::fs::write(
            &csv_path,
            "date;YouTube;Device Unlocks\n2023-06-18;60;40\n2023-06-19;5.5;\n",
        )
        .unwrap();
        let db_path = dir.path().join("usage.db");

        let loaded = load_directory(&db_path, dir.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].table, "app_usage_time_motorola");
        assert_eq!(loaded[0].rows, 2);

        let conn = Connection::open(&db_path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM app_usage_time_motorola", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 2);
        let minutes: f64 = conn
            .query_row(
                "SELECT youtube FROM app_usage_time_motorola WHERE date = '2023-06-19'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(minutes, 5.5);
        let missing: Option<f64> = conn
            .query_row(
                "SELECT device_unlocks FROM app_usage_time_motorola WHERE date = '2023-06-19'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(missing, None);
        drop(conn);

        // A second run replaces the table instead of appending.
        let reloaded = load_directory(&db_path, dir.path()).unwrap();
        assert_eq!(reloaded[0].rows, 2);
        let conn = Connection::open(&db_path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM app_usage_time_motorola", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 2);
    }
}
