// ABOUTME: Identifier quoting and display helpers shared by both database dialects
// ABOUTME: Keeps table and column names safe inside generated SQL text

use anyhow::{bail, Result};

/// Quote an identifier for the SQLite dialect
///
/// Wraps the name in double quotes and doubles any embedded double quote, so
/// every name the SQLite catalog can hold is usable in a query.
///
/// # Examples
///
/// ```
/// # use sqlite_mysql_migrator::utils::quote_sqlite_ident;
/// assert_eq!(quote_sqlite_ident("users"), "\"users\"");
/// assert_eq!(quote_sqlite_ident("odd\"name"), "\"odd\"\"name\"");
/// ```
pub fn quote_sqlite_ident(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Quote an identifier for the MySQL dialect
///
/// Wraps the name in backticks and doubles any embedded backtick. Reserved
/// words such as `order` or `group` become valid table and column names.
///
/// # Examples
///
/// ```
/// # use sqlite_mysql_migrator::utils::quote_mysql_ident;
/// assert_eq!(quote_mysql_ident("order"), "`order`");
/// assert_eq!(quote_mysql_ident("we`ird"), "`we``ird`");
/// ```
pub fn quote_mysql_ident(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// Validate a table name read from the source catalog
///
/// The catalog guarantees uniqueness; this only rejects names that cannot be
/// expressed in the target dialect at all.
pub fn validate_table_name(table: &str) -> Result<()> {
    if table.trim().is_empty() {
        bail!("Table name cannot be empty");
    }

    // MySQL identifiers are limited to 64 characters
    if table.chars().count() > 64 {
        bail!(
            "Table name '{}' exceeds MySQL's 64 character limit",
            sanitize_identifier(table)
        );
    }

    if table.contains('\0') {
        bail!(
            "Table name '{}' contains a NUL character",
            sanitize_identifier(table)
        );
    }

    Ok(())
}

/// Sanitize an identifier for display
///
/// Removes control characters and limits length so names from an untrusted
/// file cannot garble log output.
///
/// **Note**: This is for display purposes only. Use the quoting helpers for SQL.
///
/// # Examples
///
/// ```
/// # use sqlite_mysql_migrator::utils::sanitize_identifier;
/// assert_eq!(sanitize_identifier("normal_table"), "normal_table");
/// assert_eq!(sanitize_identifier("table\nname"), "tablename");
/// assert_eq!(sanitize_identifier(&"a".repeat(200)).len(), 100);
/// ```
pub fn sanitize_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| !c.is_control())
        .take(100)
        .collect()
}
