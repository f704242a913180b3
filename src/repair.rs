//! Pre-load repair of known-bad columns
//!
//! Some vendor extracts ship with missing values in NOT NULL columns, which
//! would abort the COPY mid-file. This module rewrites such a file in place
//! before it is loaded, filling empty fields in one named column with a
//! default value.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::path::Path;
use tracing::info;

/// Fill empty fields of `column` with `default_value`, rewriting the file
/// in place with the same delimiter.
///
/// Returns `Ok(false)` when the column is not present in the header row (no
/// repair was needed). The whole file is read into memory, so this is meant
/// for the handful of vocabulary files known to need it, not for arbitrary
/// multi-gigabyte inputs.
///
/// Destructive but idempotent: a second run finds no empty fields and
/// rewrites identical content.
pub fn fill_missing_values(
    path: &Path,
    delimiter: u8,
    column: &str,
    default_value: &str,
) -> Result<bool> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| format!("failed to open {} for repair", path.display()))?;

    let headers = reader
        .headers()
        .context("failed to read CSV headers")?
        .clone();

    let Some(column_idx) = headers.iter().position(|h| h == column) else {
        return Ok(false);
    };

    let mut records: Vec<StringRecord> = Vec::new();
    let mut filled = 0usize;

    for result in reader.records() {
        let record = result.context("failed to read CSV record")?;
        if record.get(column_idx).is_some_and(str::is_empty) {
            let mut fixed = StringRecord::new();
            for (i, field) in record.iter().enumerate() {
                fixed.push_field(if i == column_idx { default_value } else { field });
            }
            records.push(fixed);
            filled += 1;
        } else {
            records.push(record);
        }
    }

    drop(reader);

    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| format!("failed to rewrite {}", path.display()))?;

    writer.write_record(&headers)?;
    for record in &records {
        writer.write_record(record)?;
    }
    writer.flush().context("failed to flush repaired file")?;

    info!(
        "Filled {filled} missing values in column '{column}' of {} with '{default_value}'",
        path.display()
    );

    Ok(true)
}
