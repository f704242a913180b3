//! Streaming bulk loader
//!
//! Streams a CSV file into a destination table with `COPY ... FROM STDIN`,
//! reading the file in fixed 1 MiB chunks so peak memory stays bounded no
//! matter how large the file is. Each file load is exactly one transaction:
//! committed on full success, rolled back on any error. Failures are
//! captured into the returned [`LoadOutcome`] rather than propagated; the
//! outcome is data for the caller, not a control-flow exception.

use crate::progress;
use crate::sql::{delimiter_literal, quote_ident};
use anyhow::{Context, Result};
use bytes::Bytes;
use futures::{Sink, SinkExt};
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_postgres::{Client, CopyInSink, Transaction};
use tracing::{error, info, warn};

/// Fixed chunk size for disk reads feeding the COPY channel (1 MiB).
///
/// At most one chunk is in flight at a time; backpressure comes from the
/// sink's own write acknowledgment.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Terminal status of one file load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadStatus {
    /// File fully streamed and committed.
    Loaded,
    /// Destination table absent; file not attempted.
    SkippedNoTable,
    /// Transfer failed; transaction rolled back.
    Failed,
}

/// Result of one file load attempt. One is produced per source file, and
/// the ordered sequence of outcomes is the run's result.
#[derive(Debug, Clone, Serialize)]
pub struct LoadOutcome {
    pub file: PathBuf,
    pub table: String,
    pub status: LoadStatus,
    pub bytes_transferred: u64,
    pub error: Option<String>,
}

impl LoadOutcome {
    pub fn loaded(file: PathBuf, table: &str, bytes_transferred: u64) -> Self {
        Self {
            file,
            table: table.to_string(),
            status: LoadStatus::Loaded,
            bytes_transferred,
            error: None,
        }
    }

    pub fn skipped_no_table(file: PathBuf, table: &str) -> Self {
        Self {
            file,
            table: table.to_string(),
            status: LoadStatus::SkippedNoTable,
            bytes_transferred: 0,
            error: None,
        }
    }

    pub fn failed(file: PathBuf, table: &str, error: &anyhow::Error) -> Self {
        Self {
            file,
            table: table.to_string(),
            status: LoadStatus::Failed,
            bytes_transferred: 0,
            error: Some(format!("{error:#}")),
        }
    }
}

/// COPY statement for one file load.
///
/// QUOTE is the backspace byte (`E'\b'`, 0x08). The source extracts
/// legitimately contain unescaped double quotes, so the usual quote
/// character cannot be used; a non-printable byte the data source never
/// emits stands in for it. This is a format compatibility contract with the
/// data source: a file containing 0x08 as payload would be corrupted on
/// ingest. No pre-scan is performed, since that would double the I/O on
/// multi-gigabyte files.
fn copy_statement(schema: &str, table: &str, delimiter: u8) -> String {
    format!(
        "COPY {}.{} FROM STDIN WITH (FORMAT csv, HEADER true, DELIMITER {}, QUOTE E'\\b')",
        quote_ident(schema),
        quote_ident(table),
        delimiter_literal(delimiter)
    )
}

/// Stream a file into `schema.table` inside a single transaction.
///
/// Never returns an error: every failure path rolls back the transaction
/// and is captured into a `Failed` outcome.
pub async fn copy_file(
    client: &mut Client,
    schema: &str,
    table: &str,
    path: &Path,
    delimiter: u8,
) -> LoadOutcome {
    let tx = match client.transaction().await {
        Ok(tx) => tx,
        Err(e) => {
            let e = anyhow::Error::new(e).context("failed to open transaction");
            error!("Failed to load '{table}': {e:#}");
            return LoadOutcome::failed(path.to_path_buf(), table, &e);
        }
    };

    match stream_into(&tx, schema, table, path, delimiter).await {
        Ok(bytes_transferred) => match tx.commit().await {
            Ok(()) => {
                info!("Loaded {bytes_transferred} bytes into {schema}.{table}");
                LoadOutcome::loaded(path.to_path_buf(), table, bytes_transferred)
            }
            Err(e) => {
                let e = anyhow::Error::new(e).context("failed to commit load transaction");
                error!("Failed to load '{table}': {e:#}");
                LoadOutcome::failed(path.to_path_buf(), table, &e)
            }
        },
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!("Rollback after failed load of '{table}' also failed: {rollback_err}");
            }
            error!("Failed to load '{table}': {e:#}");
            LoadOutcome::failed(path.to_path_buf(), table, &e)
        }
    }
}

/// Open the file and drive the COPY channel to completion.
async fn stream_into(
    tx: &Transaction<'_>,
    schema: &str,
    table: &str,
    path: &Path,
    delimiter: u8,
) -> Result<u64> {
    // Total size is instrumentation for the progress bar, not a correctness
    // requirement.
    let file_size = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("failed to stat {}", path.display()))?
        .len();

    let mut file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("failed to open {}", path.display()))?;

    let statement = copy_statement(schema, table, delimiter);
    let sink: CopyInSink<Bytes> = tx
        .copy_in(statement.as_str())
        .await
        .context("failed to initiate COPY")?;
    let mut sink = Box::pin(sink);

    let pb = progress::transfer_bar(file_size, table);
    let bytes_transferred = pump(&mut file, &mut sink, &pb).await?;

    let rows = sink
        .as_mut()
        .finish()
        .await
        .context("failed to finish COPY")?;
    pb.finish_and_clear();

    info!("COPY into {schema}.{table} wrote {rows} rows");
    Ok(bytes_transferred)
}

/// Pump a reader into a sink in fixed-size chunks, returning the total
/// number of bytes transferred.
pub(crate) async fn pump<R, S>(reader: &mut R, sink: &mut S, progress: &ProgressBar) -> Result<u64>
where
    R: AsyncRead + Unpin,
    S: Sink<Bytes> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let n = reader
            .read(&mut buf)
            .await
            .context("failed to read from source file")?;
        if n == 0 {
            break;
        }
        sink.send(Bytes::copy_from_slice(&buf[..n]))
            .await
            .context("failed to write chunk to COPY channel")?;
        total += n as u64;
        progress.inc(n as u64);
    }

    Ok(total)
}
