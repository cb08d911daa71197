// ABOUTME: Write migrated schema and row windows to MySQL
// ABOUTME: Each window runs inside its own transaction scope that rolls back unless committed

use crate::error::MigrationError;
use crate::utils::quote_mysql_ident;
use anyhow::{Context, Result};
use async_trait::async_trait;
use mysql_async::{prelude::*, Conn, TxOpts, Value};

/// Placeholder limit of a single prepared statement in the MySQL protocol
pub const MAX_PLACEHOLDERS: usize = u16::MAX as usize;

/// What happened to one window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowOutcome {
    Committed,
    /// The window was rolled back; `message` is the server's reason
    RolledBack { message: String },
}

/// Column-bound INSERT for one table, built once per table copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    table: String,
    columns: Vec<String>,
    prefix: String,
    row_placeholders: String,
}

impl InsertStatement {
    pub fn new(table: &str, columns: &[String]) -> Self {
        let column_list = columns
            .iter()
            .map(|c| quote_mysql_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let row_placeholders = format!("({})", vec!["?"; columns.len()].join(", "));

        Self {
            table: table.to_string(),
            columns: columns.to_vec(),
            prefix: format!(
                "INSERT INTO {} ({}) VALUES ",
                quote_mysql_ident(table),
                column_list
            ),
            row_placeholders,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether `rows` rows fit in one multi-row statement
    pub fn fits_single_statement(&self, rows: usize) -> bool {
        rows.saturating_mul(self.columns.len()) <= MAX_PLACEHOLDERS
    }

    /// `INSERT ... VALUES (?, ?), (?, ?)` for `rows` rows
    pub fn multi_row_sql(&self, rows: usize) -> String {
        let values = vec![self.row_placeholders.as_str(); rows].join(", ");
        format!("{}{}", self.prefix, values)
    }

    /// `INSERT ... VALUES (?, ?)` for a single row
    pub fn single_row_sql(&self) -> String {
        self.multi_row_sql(1)
    }
}

/// The target side of a migration
///
/// Implemented by [`MysqlTarget`] and by test doubles, so the schema and copy
/// stages can run without a server.
#[async_trait]
pub trait TargetWriter: Send {
    /// Execute one DDL statement
    async fn execute_ddl(&mut self, sql: &str) -> Result<()>;

    /// Insert one window of rows atomically
    ///
    /// An insert failure is reported as [`WindowOutcome::RolledBack`]. An `Err`
    /// means the target itself is unusable and the run must stop.
    async fn write_window(
        &mut self,
        insert: &InsertStatement,
        rows: Vec<Vec<Value>>,
    ) -> Result<WindowOutcome>;
}

/// Target backed by a single MySQL connection
pub struct MysqlTarget {
    conn: Conn,
}

impl MysqlTarget {
    pub fn new(conn: Conn) -> Self {
        Self { conn }
    }

    /// Open the target connection
    pub async fn connect(options: &super::TargetOptions) -> Result<Self> {
        Ok(Self::new(super::connect_mysql(options).await?))
    }

    /// Close the connection gracefully
    pub async fn disconnect(self) -> Result<()> {
        self.conn
            .disconnect()
            .await
            .context("Failed to close MySQL connection")
    }
}

#[async_trait]
impl TargetWriter for MysqlTarget {
    async fn execute_ddl(&mut self, sql: &str) -> Result<()> {
        self.conn
            .query_drop(sql)
            .await
            .context("Failed to execute DDL statement")
    }

    async fn write_window(
        &mut self,
        insert: &InsertStatement,
        rows: Vec<Vec<Value>>,
    ) -> Result<WindowOutcome> {
        let row_count = rows.len();
        let mut tx = self
            .conn
            .start_transaction(TxOpts::default())
            .await
            .map_err(|e| MigrationError::connection("mysql", e))
            .with_context(|| {
                format!("Failed to start transaction for table '{}'", insert.table())
            })?;

        let written = if insert.fits_single_statement(row_count) {
            let sql = insert.multi_row_sql(row_count);
            let params: Vec<Value> = rows.into_iter().flatten().collect();
            tx.exec_drop(sql.as_str(), params).await
        } else {
            tracing::debug!(
                "Window of {} rows exceeds the placeholder limit for '{}', inserting row by row",
                row_count,
                insert.table()
            );
            let sql = insert.single_row_sql();
            tx.exec_batch(sql.as_str(), rows).await
        };

        match written {
            Ok(()) => match tx.commit().await {
                Ok(()) => Ok(WindowOutcome::Committed),
                // Dropping an uncommitted transaction rolls it back
                Err(e) => Ok(WindowOutcome::RolledBack {
                    message: e.to_string(),
                }),
            },
            Err(e) => {
                tx.rollback().await.with_context(|| {
                    format!("Failed to roll back window for table '{}'", insert.table())
                })?;
                Ok(WindowOutcome::RolledBack {
                    message: e.to_string(),
                })
            }
        }
    }
}
