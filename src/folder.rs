//! Folder-level load orchestration
//!
//! Enumerates the CSV files of a source folder, derives the destination
//! table per file, applies the pre-load repair where applicable, and
//! sequentially drives the streaming loader. Per-file outcomes are
//! independent, with one asymmetry that is deliberate policy: a missing
//! table only skips that file, but a hard load failure halts the remaining
//! queue, because continuing after a failed table risks masking
//! order-dependent follow-on failures in partially-loaded data.

use crate::load::{LoadOutcome, LoadStatus};
use crate::warehouse::Warehouse;
use crate::{delimiter, repair};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Filename-stem keyword that redirects a file to the `concept` table.
pub const CPT4_TABLE_KEYWORD: &str = "concept_cpt4";

/// CPT4 concept extracts ship with empty names that violate the NOT NULL
/// constraint on this column; they are filled before load.
pub const CPT4_REPAIR_COLUMN: &str = "concept_name";
pub const CPT4_REPAIR_DEFAULT: &str = "Unknown CPT4 Concept";

/// Derive the destination table name for a source file.
///
/// The filename stem is lower-cased; CPT4 concept files are redirected to
/// the logical `concept` table. Deterministic and side-effect-free.
pub fn table_name_for_file(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| file_name.to_lowercase());

    if stem.contains(CPT4_TABLE_KEYWORD) {
        "concept".to_string()
    } else {
        stem
    }
}

/// Load every CSV file of `folder` into `schema`, in lexicographic filename
/// order, one transaction per file.
///
/// Returns one [`LoadOutcome`] per file actually attempted. A missing folder
/// or an empty folder is reported and yields an empty sequence. A trailing
/// `Failed` outcome means the remaining files were never attempted.
pub async fn process_folder<W: Warehouse>(
    warehouse: &mut W,
    schema: &str,
    folder: &Path,
    default_delimiter: u8,
) -> Vec<LoadOutcome> {
    info!("Starting to process files in: {}", folder.display());

    let files = match list_csv_files(folder).await {
        Ok(files) => files,
        Err(e) => {
            error!("Cannot enumerate folder {}: {e:#}", folder.display());
            return Vec::new();
        }
    };

    if files.is_empty() {
        info!("No .csv files found in {}", folder.display());
        return Vec::new();
    }

    let mut outcomes = Vec::with_capacity(files.len());

    for path in &files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = table_stem(&file_name);
        let table = table_name_for_file(&file_name);
        let field_delimiter = delimiter::resolve(&stem, default_delimiter);

        if stem.contains(CPT4_TABLE_KEYWORD) {
            match repair::fill_missing_values(
                path,
                field_delimiter,
                CPT4_REPAIR_COLUMN,
                CPT4_REPAIR_DEFAULT,
            ) {
                Ok(true) => {}
                Ok(false) => warn!(
                    "Column '{CPT4_REPAIR_COLUMN}' not present in '{file_name}'; nothing to repair"
                ),
                // Advisory: the load is still attempted.
                Err(e) => warn!("Repair of '{file_name}' failed: {e:#}"),
            }
        }

        // Re-checked per file: DDL steps may create tables mid-run.
        if !warehouse.table_exists(schema, &table).await {
            warn!("Table '{table}' does not exist in schema '{schema}'. Skipping file '{file_name}'.");
            outcomes.push(LoadOutcome::skipped_no_table(path.clone(), &table));
            continue;
        }

        let outcome = warehouse
            .load_file(schema, &table, path, field_delimiter)
            .await;
        let failed = outcome.status == LoadStatus::Failed;
        outcomes.push(outcome);

        if failed {
            error!("Stopping folder processing after hard failure on '{file_name}'");
            break;
        }
    }

    info!(
        "Folder processing complete: {} of {} files attempted",
        outcomes.len(),
        files.len()
    );

    outcomes
}

fn table_stem(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| file_name.to_lowercase())
}

/// Enumerate `.csv` files (case-insensitive extension), sorted
/// lexicographically by filename for a deterministic run order.
async fn list_csv_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(folder)
        .await
        .with_context(|| format!("folder does not exist: {}", folder.display()))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .context("failed to read directory entry")?
    {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let path = entry.path();
        let is_csv = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
