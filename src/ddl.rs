//! DDL script execution
//!
//! Tables, primary keys, and indices are created from SQL script files
//! before loading; constraints are applied from another script after the
//! data is in, which is much cheaper than validating them row by row during
//! the COPY.

use anyhow::{Context, Result};
use std::path::Path;
use tokio_postgres::Client;
use tracing::info;

/// Execute one SQL script file as a single batch in its own transaction.
pub async fn run_script(client: &mut Client, path: &Path) -> Result<()> {
    let script = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read SQL script {}", path.display()))?;

    let tx = client
        .transaction()
        .await
        .context("failed to open DDL transaction")?;
    tx.batch_execute(&script)
        .await
        .with_context(|| format!("failed to execute SQL script {}", path.display()))?;
    tx.commit()
        .await
        .with_context(|| format!("failed to commit SQL script {}", path.display()))?;

    info!("Executed SQL script {}", path.display());
    Ok(())
}

/// Execute scripts in caller-given order, stopping at the first failure.
pub async fn run_scripts(client: &mut Client, paths: &[impl AsRef<Path>]) -> Result<()> {
    for path in paths {
        run_script(client, path.as_ref()).await?;
    }
    Ok(())
}
