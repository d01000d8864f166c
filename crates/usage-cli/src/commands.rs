use std::fs;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use usage_cli::pipeline::{
    SHEET_DELIMITER, filter_stage, impute_stage, output_stage, reshape_stage, unify_stage,
};
use usage_db::LoadedTable;
use usage_ingest::{list_sheet_files, read_sheet};
use usage_model::{FillPolicy, PipelineConfig, SheetKind};

use crate::cli::{FillPolicyArg, LoadDbArgs, RunArgs, SplitExportArgs};
use crate::types::{CategorySummary, RunResult, SplitResult};

pub fn run_pipeline(args: &RunArgs) -> Result<RunResult> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path).context("load configuration")?,
        None => PipelineConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config.activity_threshold = threshold;
    }
    if let Some(policy) = args.fill_policy {
        config.fill_policy = match policy {
            FillPolicyArg::Mean => FillPolicy::Mean,
            FillPolicyArg::ForwardFill => FillPolicy::ForwardFill,
            FillPolicyArg::None => FillPolicy::None,
        };
    }
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| args.input_dir.join("processed"));

    let run_span = info_span!("run", input = %args.input_dir.display());
    let _run_guard = run_span.enter();
    let start = Instant::now();

    let reshaped = reshape_stage(&args.input_dir, &config)?;
    let mut groups = reshaped.groups;
    filter_stage(&mut groups, config.activity_threshold)?;
    let unified = unify_stage(groups, &config)?;
    let imputed = impute_stage(unified, &config)?;
    let paths = output_stage(&imputed, &output_dir)?;

    let categories = imputed
        .iter()
        .zip(paths)
        .map(|(category, output)| CategorySummary {
            key: category.frame.key.to_string(),
            days: category.frame.record_count(),
            entities: category.frame.entity_columns().len(),
            dropped_duplicates: category.frame.dropped_duplicates,
            gap_filled: category.gap_filled,
            output,
        })
        .collect();

    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        batches = reshaped.batches,
        sheets = reshaped.sheets,
        "pipeline complete"
    );
    Ok(RunResult {
        output_dir,
        categories,
    })
}

/// Split combined export sheets into separate App and Web sheet files.
///
/// Later exports collapse app and site rows into one sheet. A row belongs
/// to the app sheet when its entity label starts with an uppercase letter
/// and its device tag equals the tracked phone; every other row is a site.
/// Already-split sheets and unlock sheets are copied through unchanged.
pub fn run_split_export(args: &SplitExportArgs) -> Result<SplitResult> {
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| args.input_dir.join("split"));
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("create output directory {}", output_dir.display()))?;

    let mut files = Vec::new();
    for path in list_sheet_files(&args.input_dir).context("list sheet files")? {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        if SheetKind::from_sheet_name(&stem).is_some() {
            if let Some(name) = path.file_name() {
                let dest = output_dir.join(name);
                fs::copy(&path, &dest)
                    .with_context(|| format!("copy sheet {}", path.display()))?;
                files.push(dest);
            }
            continue;
        }

        let sheet = read_sheet(&path, SHEET_DELIMITER)
            .with_context(|| format!("read sheet {}", path.display()))?;
        let Some(device_idx) = sheet.column_index("Device") else {
            info!(file = %path.display(), "no device column; leaving file alone");
            continue;
        };

        let mut app_rows: Vec<&Vec<String>> = Vec::new();
        let mut web_rows: Vec<&Vec<String>> = Vec::new();
        for row in &sheet.rows {
            let label = row.first().map(String::as_str).unwrap_or("");
            let device = row.get(device_idx).map(String::as_str).unwrap_or("");
            let is_app = label.chars().next().is_some_and(char::is_uppercase)
                && device == args.device;
            if is_app {
                app_rows.push(row);
            } else {
                web_rows.push(row);
            }
        }

        let app_path = output_dir.join(format!("App - {stem}.csv"));
        let web_path = output_dir.join(format!("Web - {stem}.csv"));
        write_split_sheet(&app_path, &sheet.headers, &app_rows)?;
        write_split_sheet(&web_path, &sheet.headers, &web_rows)?;
        info!(
            file = %path.display(),
            app_rows = app_rows.len(),
            web_rows = web_rows.len(),
            "split combined sheet"
        );
        files.push(app_path);
        files.push(web_path);
    }
    Ok(SplitResult { output_dir, files })
}

fn write_split_sheet(
    path: &std::path::Path,
    headers: &[String],
    rows: &[&Vec<String>],
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(SHEET_DELIMITER)
        .from_path(path)
        .with_context(|| format!("write sheet {}", path.display()))?;
    writer
        .write_record(headers)
        .with_context(|| format!("write sheet {}", path.display()))?;
    for row in rows {
        writer
            .write_record(row.iter())
            .with_context(|| format!("write sheet {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("write sheet {}", path.display()))?;
    Ok(())
}

pub fn run_load_db(args: &LoadDbArgs) -> Result<Vec<LoadedTable>> {
    let database = args
        .database
        .clone()
        .unwrap_or_else(|| args.data_dir.join("usage.db"));
    let loaded = usage_db::load_directory(&database, &args.data_dir)
        .with_context(|| format!("load {} into {}", args.data_dir.display(), database.display()))?;
    info!(tables = loaded.len(), database = %database.display(), "database load complete");
    Ok(loaded)
}
