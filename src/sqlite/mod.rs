// ABOUTME: SQLite source handle for migration to MySQL
// ABOUTME: Provides file path validation and read-only database connections

pub mod converter;
pub mod reader;

use crate::error::MigrationError;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// File extensions SQLite databases conventionally carry
const KNOWN_EXTENSIONS: [&str; 3] = ["db", "sqlite", "sqlite3"];

/// Validate a SQLite file path
///
/// Checks:
/// - Path is non-empty
/// - Canonicalizes path to resolve symlinks and relative paths
/// - Verifies file exists and is a regular file (not directory)
///
/// SQLite accepts any file name, so an unfamiliar extension only produces a
/// warning.
///
/// # Arguments
///
/// * `path` - Path to SQLite file (can be relative or absolute)
///
/// # Returns
///
/// Canonicalized absolute path if valid, error otherwise
///
/// # Examples
///
/// ```no_run
/// # use sqlite_mysql_migrator::sqlite::validate_sqlite_path;
/// assert!(validate_sqlite_path("database.db").is_ok());
/// assert!(validate_sqlite_path("/nonexistent.db").is_err());
/// ```
pub fn validate_sqlite_path(path: &str) -> Result<PathBuf> {
    if path.is_empty() {
        bail!("SQLite file path cannot be empty");
    }

    let path_buf = PathBuf::from(path);

    // Canonicalize also validates that the file exists
    let canonical = path_buf.canonicalize().with_context(|| {
        format!(
            "Failed to resolve SQLite file path '{}'. \
             File may not exist or may not be readable.",
            path
        )
    })?;

    if !canonical.is_file() {
        bail!("Path '{}' is not a regular file (may be a directory)", path);
    }

    let ext = canonical
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");
    if !KNOWN_EXTENSIONS.contains(&ext) {
        tracing::warn!(
            "SQLite file '{}' does not use a .db, .sqlite or .sqlite3 extension; opening anyway",
            canonical.display()
        );
    }

    tracing::debug!("Validated SQLite path: {}", canonical.display());

    Ok(canonical)
}

/// Open a SQLite database in read-only mode
///
/// The migration never writes to the source, so the handle is opened with
/// `SQLITE_OPEN_READ_ONLY`. The handle is probed with a version query so an
/// unreadable or corrupted file fails here instead of mid-migration.
///
/// # Errors
///
/// Every failure is reported as [`MigrationError::Connection`].
///
/// # Examples
///
/// ```no_run
/// # use sqlite_mysql_migrator::sqlite::open_sqlite;
/// # fn example() -> anyhow::Result<()> {
/// let conn = open_sqlite("database.db")?;
/// # Ok(())
/// # }
/// ```
pub fn open_sqlite(path: &str) -> Result<rusqlite::Connection> {
    let canonical = validate_sqlite_path(path)
        .map_err(|e| MigrationError::connection("sqlite", format!("{:#}", e)))?;

    tracing::info!("Opening SQLite database: {}", canonical.display());

    let conn = rusqlite::Connection::open_with_flags(
        &canonical,
        rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
    )
    .map_err(|e| MigrationError::connection("sqlite", e))
    .with_context(|| format!("Failed to open SQLite database: {}", canonical.display()))?;

    let version: String = conn
        .query_row("SELECT sqlite_version()", [], |row| row.get(0))
        .map_err(|e| MigrationError::connection("sqlite", e))
        .context("Failed to query SQLite version (database may be corrupted)")?;

    tracing::debug!("Successfully opened SQLite database (version {})", version);

    Ok(conn)
}
