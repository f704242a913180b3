//! Schema, role, and user provisioning
//!
//! One-time administrative setup for a fresh warehouse: schemas, a NOLOGIN
//! role per privilege set, login users, and the grants tying them together.
//! Role and user creation tolerate re-runs by skipping duplicates; grants
//! are idempotent on the server side.

use crate::sql::{quote_ident, quote_literal};
use anyhow::{Context, Result};
use tokio_postgres::error::SqlState;
use tokio_postgres::Client;
use tracing::{info, warn};

/// Create every schema in the list if it does not already exist.
pub async fn create_schemas(client: &Client, schemas: &[String]) -> Result<()> {
    for schema in schemas {
        client
            .batch_execute(&format!(
                "CREATE SCHEMA IF NOT EXISTS {}",
                quote_ident(schema)
            ))
            .await
            .with_context(|| format!("failed to create schema '{schema}'"))?;
    }
    info!("Schemas created: {}", schemas.join(", "));
    Ok(())
}

/// Create a NOLOGIN role, skipping it if it already exists.
pub async fn create_role(client: &Client, role: &str) -> Result<()> {
    match client
        .batch_execute(&format!("CREATE ROLE {} NOLOGIN", quote_ident(role)))
        .await
    {
        Ok(()) => {
            info!("Role '{role}' created");
            Ok(())
        }
        Err(e) if e.code() == Some(&SqlState::DUPLICATE_OBJECT) => {
            warn!("Role '{role}' already exists. Skipping creation.");
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("failed to create role '{role}'")),
    }
}

/// Create a login user, skipping it if it already exists.
pub async fn create_user(client: &Client, user: &str, password: &str) -> Result<()> {
    match client
        .batch_execute(&format!(
            "CREATE USER {} WITH PASSWORD {}",
            quote_ident(user),
            quote_literal(password)
        ))
        .await
    {
        Ok(()) => {
            info!("User '{user}' created");
            Ok(())
        }
        Err(e) if e.code() == Some(&SqlState::DUPLICATE_OBJECT) => {
            warn!("User '{user}' already exists. Skipping creation.");
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("failed to create user '{user}'")),
    }
}

/// Allow a role to connect to the database.
pub async fn grant_database_access(client: &Client, role: &str, database: &str) -> Result<()> {
    client
        .batch_execute(&format!(
            "GRANT CONNECT ON DATABASE {} TO {}",
            quote_ident(database),
            quote_ident(role)
        ))
        .await
        .with_context(|| format!("failed to grant CONNECT on '{database}' to '{role}'"))?;
    info!("Granted CONNECT on database '{database}' to role '{role}'");
    Ok(())
}

/// Grant read-only privileges on a schema, including future tables.
pub async fn grant_read_only(client: &Client, role: &str, schema: &str) -> Result<()> {
    let schema_q = quote_ident(schema);
    let role_q = quote_ident(role);
    client
        .batch_execute(&format!(
            "GRANT USAGE ON SCHEMA {schema_q} TO {role_q};\n\
             GRANT SELECT ON ALL TABLES IN SCHEMA {schema_q} TO {role_q};\n\
             ALTER DEFAULT PRIVILEGES IN SCHEMA {schema_q} GRANT SELECT ON TABLES TO {role_q};"
        ))
        .await
        .with_context(|| format!("failed to grant read-only privileges to '{role}'"))?;
    info!("Read-only privileges granted to role '{role}' on schema {schema}");
    Ok(())
}

/// Grant read-write privileges on a schema: tables, sequences, and the
/// default privileges covering objects created later.
pub async fn grant_read_write(client: &Client, role: &str, schema: &str) -> Result<()> {
    let schema_q = quote_ident(schema);
    let role_q = quote_ident(role);
    client
        .batch_execute(&format!(
            "GRANT USAGE, CREATE ON SCHEMA {schema_q} TO {role_q};\n\
             GRANT SELECT, INSERT, UPDATE, DELETE ON ALL TABLES IN SCHEMA {schema_q} TO {role_q};\n\
             ALTER DEFAULT PRIVILEGES IN SCHEMA {schema_q} GRANT SELECT, INSERT, UPDATE, DELETE ON TABLES TO {role_q};\n\
             GRANT USAGE ON ALL SEQUENCES IN SCHEMA {schema_q} TO {role_q};\n\
             ALTER DEFAULT PRIVILEGES IN SCHEMA {schema_q} GRANT USAGE ON SEQUENCES TO {role_q};"
        ))
        .await
        .with_context(|| format!("failed to grant read-write privileges to '{role}'"))?;
    info!("Read-write privileges granted to role '{role}' on schema {schema}");
    Ok(())
}

/// Grant a role to a user.
pub async fn assign_role(client: &Client, user: &str, role: &str) -> Result<()> {
    client
        .batch_execute(&format!(
            "GRANT {} TO {}",
            quote_ident(role),
            quote_ident(user)
        ))
        .await
        .with_context(|| format!("failed to grant role '{role}' to '{user}'"))?;
    info!("Granted role '{role}' to user '{user}'");
    Ok(())
}

/// Transfer ownership of a schema to a role.
pub async fn set_schema_owner(client: &Client, schema: &str, role: &str) -> Result<()> {
    client
        .batch_execute(&format!(
            "ALTER SCHEMA {} OWNER TO {}",
            quote_ident(schema),
            quote_ident(role)
        ))
        .await
        .with_context(|| format!("failed to transfer ownership of '{schema}' to '{role}'"))?;
    info!("Schema '{schema}' ownership transferred to role '{role}'");
    Ok(())
}
