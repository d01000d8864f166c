//! Staged pipeline over an export directory.
//!
//! The stages run in dependency order, each consuming the prior stage's
//! output:
//!
//! 1. **Reshape**: read every sheet of every export batch into long,
//!    date-keyed category tables.
//! 2. **Filter**: drop low-signal entity columns (unlock tables are
//!    exempt: their single column is the category).
//! 3. **Unify**: combine same-category tables across batches (outer
//!    union on `date` for usage tables, row concatenation for unlocks).
//! 4. **Impute**: resample to daily cadence and repair gaps per category
//!    policy.
//! 5. **Output**: write one delimited file per category.
//!
//! A failing stage aborts the run; outputs are only valid when every stage
//! for a category succeeded.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use usage_ingest::{classify_sheet_file, list_batch_dirs, list_sheet_files, read_sheet};
use usage_model::{FillPolicy, PipelineConfig, SheetKind};
use usage_output::write_frame;
use usage_transform::{
    CategoryFrame, GapFillOptions, ReshapeOptions, concat_unlock_frames, fill_date_gaps,
    filter_columns, merge_frames, reshape_sheet,
};

/// Delimiter of raw export sheet files.
pub const SHEET_DELIMITER: u8 = b',';

/// Same-category tables collected across export batches.
#[derive(Debug)]
pub struct CategoryGroup {
    pub kind: SheetKind,
    pub frames: Vec<CategoryFrame>,
}

/// Result of the reshape stage.
#[derive(Debug)]
pub struct ReshapeResult {
    /// Category key → tables from every batch carrying that key.
    pub groups: BTreeMap<String, CategoryGroup>,
    pub batches: usize,
    pub sheets: usize,
}

/// A category table after imputation, ready for output.
#[derive(Debug)]
pub struct ImputedCategory {
    pub frame: CategoryFrame,
    pub gap_filled: bool,
}

/// Read and reshape every recognized sheet in every batch.
pub fn reshape_stage(input_dir: &Path, config: &PipelineConfig) -> Result<ReshapeResult> {
    let options = ReshapeOptions {
        aliases: &config.device_aliases,
        default_device: &config.default_device,
    };
    let batch_dirs = list_batch_dirs(input_dir).context("list export batches")?;
    let batches = batch_dirs.len();

    let mut groups: BTreeMap<String, CategoryGroup> = BTreeMap::new();
    let mut sheets = 0usize;
    for batch_dir in batch_dirs {
        for sheet_path in list_sheet_files(&batch_dir).context("list sheet files")? {
            let Some((kind, measure)) = classify_sheet_file(&sheet_path) else {
                continue;
            };
            let sheet = read_sheet(&sheet_path, SHEET_DELIMITER)
                .with_context(|| format!("read sheet {}", sheet_path.display()))?;
            let frames = reshape_sheet(&sheet, kind, measure, &options)
                .with_context(|| format!("reshape sheet {}", sheet_path.display()))?;
            sheets += 1;
            for frame in frames {
                debug!(
                    key = %frame.key,
                    rows = frame.record_count(),
                    batch = %batch_dir.display(),
                    "reshaped table"
                );
                let key = frame.key.to_string();
                let group = groups.entry(key.clone()).or_insert_with(|| CategoryGroup {
                    kind,
                    frames: Vec::new(),
                });
                if group.kind != kind {
                    warn!(key = %key, "category appears under conflicting sheet kinds");
                }
                group.frames.push(frame);
            }
        }
    }
    info!(batches, sheets, categories = groups.len(), "reshape stage complete");
    Ok(ReshapeResult {
        groups,
        batches,
        sheets,
    })
}

/// Drop low-signal entity columns from every usage table.
///
/// Unlock tables keep their single tracked column regardless of activity.
pub fn filter_stage(
    groups: &mut BTreeMap<String, CategoryGroup>,
    threshold: i64,
) -> Result<()> {
    for (key, group) in groups.iter_mut() {
        if group.kind == SheetKind::DeviceUnlocks {
            continue;
        }
        let mut filtered = Vec::with_capacity(group.frames.len());
        for frame in &group.frames {
            let frame = filter_columns(frame, threshold)
                .with_context(|| format!("filter columns of {key}"))?;
            filtered.push(frame);
        }
        group.frames = filtered;
    }
    info!(threshold, "filter stage complete");
    Ok(())
}

/// Combine same-category tables from different batches into one table.
pub fn unify_stage(
    groups: BTreeMap<String, CategoryGroup>,
    config: &PipelineConfig,
) -> Result<Vec<CategoryFrame>> {
    let mut unified = Vec::with_capacity(groups.len());
    for (key, group) in groups {
        let sources = group.frames.len();
        let frame = match group.kind {
            SheetKind::DeviceUnlocks => concat_unlock_frames(&group.frames, &config.unlock_column)
                .with_context(|| format!("concatenate unlock tables for {key}"))?,
            _ => merge_frames(group.frames).with_context(|| format!("merge tables for {key}"))?,
        };
        debug!(key = %key, sources, rows = frame.record_count(), "unified category");
        unified.push(frame);
    }
    info!(categories = unified.len(), "unify stage complete");
    Ok(unified)
}

/// Resample every table to daily cadence, repairing gaps for allow-listed
/// categories.
pub fn impute_stage(
    frames: Vec<CategoryFrame>,
    config: &PipelineConfig,
) -> Result<Vec<ImputedCategory>> {
    let mut imputed = Vec::with_capacity(frames.len());
    for frame in frames {
        let key = frame.key.to_string();
        let gap_filled =
            config.should_gap_fill(&key) && config.fill_policy != FillPolicy::None;
        let options = GapFillOptions {
            excluded_dates: config.excluded_dates.clone(),
            policy: if gap_filled {
                config.fill_policy
            } else {
                FillPolicy::None
            },
            zero_as_missing: config.zero_is_missing(&key),
        };
        let frame = fill_date_gaps(&frame, &options)
            .with_context(|| format!("resample table for {key}"))?;
        debug!(key = %key, rows = frame.record_count(), gap_filled, "imputed category");
        imputed.push(ImputedCategory { frame, gap_filled });
    }
    info!(categories = imputed.len(), "impute stage complete");
    Ok(imputed)
}

/// Write one delimited file per category into `output_dir`.
pub fn output_stage(
    categories: &[ImputedCategory],
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create output directory {}", output_dir.display()))?;
    let mut paths = Vec::with_capacity(categories.len());
    for category in categories {
        let path = output_dir.join(format!("{}.csv", category.frame.key));
        write_frame(&category.frame, &path)
            .with_context(|| format!("write table {}", path.display()))?;
        paths.push(path);
    }
    info!(files = paths.len(), output_dir = %output_dir.display(), "output stage complete");
    Ok(paths)
}
