// ABOUTME: Error taxonomy for the migration pipeline
// ABOUTME: Distinguishes fatal connection/schema failures from recoverable window failures

use thiserror::Error;

/// Errors raised while migrating a SQLite database into MySQL.
///
/// Every kind except [`MigrationError::BatchInsert`] is fatal and travels up to
/// `main` wrapped in an `anyhow::Error`. A failed window is rolled back, reported
/// and skipped by the copier.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// Either database is unreachable or rejected the credentials.
    #[error("Connection error ({engine}): {message}")]
    Connection {
        engine: &'static str,
        message: String,
    },

    /// A metadata query against the source failed.
    #[error("Failed to read schema of table '{table}': {message}")]
    SchemaRead { table: String, message: String },

    /// A listed table was gone by the time it was described.
    #[error("Table '{0}' not found in source database")]
    TableNotFound(String),

    /// One window's bulk insert failed and was rolled back.
    #[error("Failed to insert rows {offset}..{end} into '{table}': {message}")]
    BatchInsert {
        table: String,
        offset: usize,
        end: usize,
        message: String,
    },
}

impl MigrationError {
    pub fn connection(engine: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Connection {
            engine,
            message: err.to_string(),
        }
    }

    pub fn schema_read(table: &str, err: impl std::fmt::Display) -> Self {
        Self::SchemaRead {
            table: table.to_string(),
            message: err.to_string(),
        }
    }
}
