//! omop-load library
//!
//! A library for provisioning an OMOP CDM PostgreSQL warehouse and
//! bulk-loading it from folders of CSV files.
//!
//! # Features
//!
//! - Schema, role, and user provisioning with grant management
//! - DDL script execution (tables, primary keys, indices, constraints)
//! - Streaming CSV ingestion via `COPY ... FROM STDIN` in bounded-memory
//!   chunks, one transaction per file
//! - Per-table delimiter overrides and pre-load repair of known-bad columns
//!
//! # CLI Usage
//!
//! ```bash
//! # Create schemas, roles, and users
//! omop-load provision --database-url postgres://... --cdm-schema cdm ...
//!
//! # Execute DDL scripts in order
//! omop-load ddl --database-url postgres://... --script ddl/tables.sql --script ddl/keys.sql
//!
//! # Bulk-load a folder of CSV files into a schema
//! omop-load load --database-url postgres://... --schema cdm --folder ./data --delimiter ','
//! ```

pub mod catalog;
pub mod config;
pub mod ddl;
pub mod delimiter;
pub mod folder;
pub mod load;
pub mod progress;
pub mod provision;
pub mod repair;
pub mod sql;
pub mod warehouse;

pub use config::{connect, ConnectOpts};
pub use folder::process_folder;
pub use load::{LoadOutcome, LoadStatus};
pub use warehouse::{PgWarehouse, Warehouse};
