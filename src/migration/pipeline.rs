// ABOUTME: Two-pass migration over explicit source and target handles
// ABOUTME: Creates every target table first, then copies the data table by table

use super::copy::{copy_table, CopyStats};
use super::schema::create_table;
use crate::mysql::writer::TargetWriter;
use crate::sqlite::reader;
use crate::utils::{sanitize_identifier, validate_table_name};
use anyhow::{Context, Result};
use rusqlite::Connection;

/// Outcome of copying one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table: String,
    pub stats: CopyStats,
}

/// Migrate every user table of `source` into `target`
///
/// Pass one describes each table and creates it on the target. Pass two copies
/// the rows, so every target table exists before any data moves.
pub async fn run_migration<W>(
    source: &Connection,
    target: &mut W,
    batch_size: usize,
) -> Result<Vec<TableReport>>
where
    W: TargetWriter + ?Sized,
{
    let tables = reader::list_tables(source)?;
    tracing::info!("Tables found: {:?}", tables);

    for table in &tables {
        validate_table_name(table)?;
        tracing::info!("Creating table {} on MySQL...", sanitize_identifier(table));

        let columns = reader::describe_columns(source, table)?;
        create_table(target, table, &columns).await?;
    }

    let mut reports = Vec::with_capacity(tables.len());
    for table in &tables {
        tracing::info!("Starting copy of table {}...", sanitize_identifier(table));

        let stats = copy_table(source, target, table, batch_size)
            .await
            .with_context(|| format!("Failed to copy table '{}'", table))?;
        reports.push(TableReport {
            table: table.clone(),
            stats,
        });
    }

    Ok(reports)
}
