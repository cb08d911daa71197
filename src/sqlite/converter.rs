// ABOUTME: SQLite to MySQL value conversion for bulk inserts
// ABOUTME: Maps each SQLite storage class onto a MySQL protocol parameter

use mysql_async::Value as MysqlValue;
use rusqlite::types::Value as SqliteValue;

/// Convert a single SQLite value to a MySQL parameter
///
/// Maps SQLite storage classes to MySQL protocol values:
/// - NULL → NULL
/// - INTEGER → Int (i64)
/// - REAL → Double (f64)
/// - TEXT → Bytes (UTF-8)
/// - BLOB → Bytes (raw)
///
/// The target column type decides how MySQL stores the bytes, which is why
/// TEXT and BLOB share a representation on the wire.
///
/// # Examples
///
/// ```
/// # use sqlite_mysql_migrator::sqlite::converter::sqlite_value_to_mysql;
/// # use rusqlite::types::Value;
/// let value = sqlite_value_to_mysql(Value::Integer(42));
/// assert_eq!(value, mysql_async::Value::Int(42));
/// ```
pub fn sqlite_value_to_mysql(value: SqliteValue) -> MysqlValue {
    match value {
        SqliteValue::Null => MysqlValue::NULL,
        SqliteValue::Integer(i) => MysqlValue::Int(i),
        SqliteValue::Real(f) => MysqlValue::Double(f),
        SqliteValue::Text(s) => MysqlValue::Bytes(s.into_bytes()),
        SqliteValue::Blob(b) => MysqlValue::Bytes(b),
    }
}

/// Convert a positional SQLite row into MySQL parameters, preserving order
pub fn sqlite_row_to_params(row: Vec<SqliteValue>) -> Vec<MysqlValue> {
    row.into_iter().map(sqlite_value_to_mysql).collect()
}
