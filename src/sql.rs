//! SQL string construction helpers
//!
//! tokio-postgres has no server-side identifier quoting for DDL and COPY
//! statements, so identifiers and literals are escaped here before being
//! interpolated into statement text.

/// Quote a schema, table, role, or column name as a PostgreSQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string value as a PostgreSQL literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Render a single-byte field delimiter as a COPY option literal.
///
/// Tab needs the escape-string form; everything else is a plain
/// single-character literal.
pub fn delimiter_literal(delimiter: u8) -> String {
    match delimiter {
        b'\t' => "E'\\t'".to_string(),
        b'\'' => "''''".to_string(),
        d => format!("'{}'", d as char),
    }
}
