//! Destination catalog lookups

use anyhow::{Context, Result};
use tokio_postgres::Client;

/// Check whether `schema.table` exists in the destination catalog.
///
/// Read-only `information_schema` lookup. Existence is intentionally not
/// cached: DDL steps may create tables concurrently with a long run, so the
/// orchestrator re-checks before every file.
pub async fn table_exists(client: &Client, schema: &str, table: &str) -> Result<bool> {
    let row = client
        .query_one(
            "SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = $1 AND table_name = $2
            )",
            &[&schema, &table],
        )
        .await
        .context("failed to query information_schema.tables")?;

    Ok(row.get(0))
}
