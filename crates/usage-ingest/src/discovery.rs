//! Export batch and sheet-file discovery.

use std::path::{Path, PathBuf};

use tracing::debug;

use usage_model::{MeasureKind, SheetKind};

use crate::error::IngestError;

/// List the export batches under an input directory.
///
/// Each subdirectory is one export batch (sheets from one spreadsheet
/// export). A directory with no subdirectories is itself a single batch.
/// Batches are returned sorted by name so that earlier exports merge first.
pub fn list_batch_dirs(input_dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let entries = std::fs::read_dir(input_dir).map_err(|source| IngestError::ReadDir {
        path: input_dir.to_path_buf(),
        source,
    })?;
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    if dirs.is_empty() {
        return Ok(vec![input_dir.to_path_buf()]);
    }
    Ok(dirs)
}

/// List sheet files (`*.csv`) in one batch directory, sorted by name.
pub fn list_sheet_files(batch_dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let entries = std::fs::read_dir(batch_dir).map_err(|source| IngestError::ReadDir {
        path: batch_dir.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
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
    Ok(files)
}

/// Classify a sheet file by its stem into sheet kind and measure kind.
///
/// Returns `None` for files the pipeline does not recognize, which are
/// skipped with a debug log rather than failing the batch.
pub fn classify_sheet_file(path: &Path) -> Option<(SheetKind, MeasureKind)> {
    let stem = path.file_stem()?.to_string_lossy();
    let Some(kind) = SheetKind::from_sheet_name(&stem) else {
        debug!(file = %path.display(), "skipping unrecognized sheet file");
        return None;
    };
    Some((kind, MeasureKind::from_sheet_name(&stem)))
}
