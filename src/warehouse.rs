//! Destination warehouse abstraction
//!
//! The folder orchestrator only needs two operations against the
//! destination: an existence check and a file load. Putting them behind a
//! trait keeps the orchestration policy testable without a live database.

use crate::load::LoadOutcome;
use crate::{catalog, load};
use async_trait::async_trait;
use std::path::Path;
use tokio_postgres::Client;
use tracing::error;

/// Destination store for bulk loads.
///
/// Implementations own a single connection context; callers drive it
/// strictly sequentially.
#[async_trait]
pub trait Warehouse {
    /// Whether `schema.table` exists right now. Fail-closed: implementations
    /// report lookup errors and answer `false` rather than propagating,
    /// which turns a flaky catalog query into a skipped file instead of a
    /// crashed run.
    async fn table_exists(&mut self, schema: &str, table: &str) -> bool;

    /// Load one file into `schema.table` as a single transaction.
    async fn load_file(
        &mut self,
        schema: &str,
        table: &str,
        path: &Path,
        delimiter: u8,
    ) -> LoadOutcome;
}

/// PostgreSQL-backed warehouse over one connection.
pub struct PgWarehouse {
    client: Client,
}

impl PgWarehouse {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Warehouse for PgWarehouse {
    async fn table_exists(&mut self, schema: &str, table: &str) -> bool {
        match catalog::table_exists(&self.client, schema, table).await {
            Ok(exists) => exists,
            Err(e) => {
                error!("Error checking if table '{schema}.{table}' exists: {e:#}");
                false
            }
        }
    }

    async fn load_file(
        &mut self,
        schema: &str,
        table: &str,
        path: &Path,
        delimiter: u8,
    ) -> LoadOutcome {
        load::copy_file(&mut self.client, schema, table, path, delimiter).await
    }
}
