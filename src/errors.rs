//! Centralised error type for the ingestor.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Missing CSV file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("{} is missing required column `{column}`", .file.display())]
    MissingColumn { file: PathBuf, column: String },

    #[error("Malformed row in {} at line {line}: {reason}", .file.display())]
    MalformedRow {
        file: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Failed to create table {table}: {source}")]
    Schema {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Table {table} has columns {found:?}, expected {expected:?}")]
    SchemaMismatch {
        table: &'static str,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Failed to insert into {table}: {source}")]
    Insert {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}
