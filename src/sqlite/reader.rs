// ABOUTME: SQLite database introspection and windowed data reading
// ABOUTME: Functions to list tables, describe columns, count rows, and read row windows

use crate::error::MigrationError;
use crate::migration::schema::ColumnDescriptor;
use crate::utils::quote_sqlite_ident;
use anyhow::{Context, Result};
use rusqlite::types::Value;
use rusqlite::{params, Connection};

/// One window of rows, each positionally aligned with the column list it was read with
pub type RowBatch = Vec<Vec<Value>>;

/// List all user tables in a SQLite database
///
/// Queries `sqlite_master` for user-created tables in catalog order.
/// Excludes `sqlite_*` internal tables (sqlite_sequence, sqlite_stat1, etc.).
/// The `_` in the reserved prefix is matched literally, so names such as
/// `sqlite3_data` are still listed.
///
/// # Examples
///
/// ```no_run
/// # use sqlite_mysql_migrator::sqlite::{open_sqlite, reader::list_tables};
/// # fn example() -> anyhow::Result<()> {
/// let conn = open_sqlite("database.db")?;
/// for table in list_tables(&conn)? {
///     println!("Table: {}", table);
/// }
/// # Ok(())
/// # }
/// ```
pub fn list_tables(conn: &Connection) -> Result<Vec<String>> {
    tracing::debug!("Listing tables from SQLite database");

    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' \
             AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'",
        )
        .map_err(|e| MigrationError::connection("sqlite", e))
        .context("Failed to prepare statement to list tables")?;

    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| MigrationError::connection("sqlite", e))
        .context("Failed to query table list")?
        .collect::<Result<Vec<String>, _>>()
        .map_err(|e| MigrationError::connection("sqlite", e))
        .context("Failed to collect table names")?;

    tracing::debug!("Found {} user tables in SQLite database", tables.len());

    Ok(tables)
}

/// Describe the columns of a table, ordered by column ordinal
///
/// Reads `pragma_table_info` once. The declared type is kept exactly as the
/// source catalog reports it, including the empty string for untyped columns.
///
/// # Errors
///
/// - [`MigrationError::SchemaRead`] if the metadata query fails
/// - [`MigrationError::TableNotFound`] if the table has disappeared since it was listed
pub fn describe_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnDescriptor>> {
    tracing::debug!("Describing columns of table '{}'", table);

    let mut stmt = conn
        .prepare(
            "SELECT name, type, \"notnull\", dflt_value \
             FROM pragma_table_info(?1) \
             ORDER BY cid",
        )
        .map_err(|e| MigrationError::schema_read(table, e))?;

    let columns = stmt
        .query_map([table], |row| {
            Ok(ColumnDescriptor {
                name: row.get(0)?,
                declared_type: row.get(1)?,
                not_null: row.get::<_, i64>(2)? != 0,
                default_value: row.get(3)?,
            })
        })
        .map_err(|e| MigrationError::schema_read(table, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| MigrationError::schema_read(table, e))?;

    if columns.is_empty() {
        return Err(MigrationError::TableNotFound(table.to_string()).into());
    }

    tracing::debug!(
        "Table '{}' has {} columns: {:?}",
        table,
        columns.len(),
        columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
    );

    Ok(columns)
}

/// Get row count for a specific table
///
/// Only used to size the progress indicator, so the value may be stale by the
/// time the last window is read.
pub fn get_table_row_count(conn: &Connection, table: &str) -> Result<usize> {
    tracing::debug!("Getting row count for table '{}'", table);

    let query = format!("SELECT COUNT(*) FROM {}", quote_sqlite_ident(table));

    let count: i64 = conn
        .query_row(&query, [], |row| row.get(0))
        .with_context(|| format!("Failed to count rows in table '{}'", table))?;

    Ok(count.max(0) as usize)
}

/// Read one window of rows from a table
///
/// Selects `columns` explicitly (never `*`) so every tuple lines up with the
/// INSERT column list built from the same metadata read. Rows come back in the
/// engine's natural order.
///
/// # Arguments
///
/// * `conn` - SQLite database connection
/// * `table` - Table name
/// * `columns` - Column names in ordinal order
/// * `limit` - Maximum rows in the window
/// * `offset` - Rows to skip
pub fn read_window(
    conn: &Connection,
    table: &str,
    columns: &[String],
    limit: usize,
    offset: usize,
) -> Result<RowBatch> {
    let column_list = columns
        .iter()
        .map(|c| quote_sqlite_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let query = format!(
        "SELECT {} FROM {} LIMIT ?1 OFFSET ?2",
        column_list,
        quote_sqlite_ident(table)
    );

    let mut stmt = conn
        .prepare(&query)
        .with_context(|| format!("Failed to prepare window query for table '{}'", table))?;

    let width = columns.len();
    let rows = stmt
        .query_map(params![limit as i64, offset as i64], |row| {
            (0..width)
                .map(|idx| row.get::<_, Value>(idx))
                .collect::<Result<Vec<_>, _>>()
        })
        .with_context(|| format!("Failed to query rows from table '{}'", table))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to collect rows from table '{}'", table))?;

    tracing::trace!(
        "Read {} rows from table '{}' at offset {}",
        rows.len(),
        table,
        offset
    );

    Ok(rows)
}
