use std::path::PathBuf;

/// Result of a full pipeline run.
#[derive(Debug)]
pub struct RunResult {
    pub output_dir: PathBuf,
    pub categories: Vec<CategorySummary>,
}

/// Per-category outcome shown in the run summary.
#[derive(Debug)]
pub struct CategorySummary {
    pub key: String,
    /// Calendar days covered after resampling.
    pub days: usize,
    /// Entity columns surviving the filter.
    pub entities: usize,
    /// Duplicate entity columns dropped while reshaping.
    pub dropped_duplicates: usize,
    pub gap_filled: bool,
    pub output: PathBuf,
}

/// Result of splitting combined export sheets.
#[derive(Debug)]
pub struct SplitResult {
    pub output_dir: PathBuf,
    pub files: Vec<PathBuf>,
}
