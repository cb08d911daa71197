// ABOUTME: Windowed row copy from a SQLite table into its MySQL counterpart
// ABOUTME: Paginates with LIMIT/OFFSET, commits per window and skips windows that fail

use crate::error::MigrationError;
use crate::mysql::writer::{InsertStatement, TargetWriter, WindowOutcome};
use crate::sqlite::{converter, reader};
use crate::utils::sanitize_identifier;
use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;

/// Rows read and written per window
pub const BATCH_SIZE: usize = 1000;

/// Counters for one table copy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyStats {
    /// Pagination queries issued, including the terminating empty one
    pub windows_read: usize,
    pub rows_read: usize,
    pub rows_committed: usize,
    pub windows_rolled_back: usize,
}

/// Copy every row of `table` into the target in windows of `batch_size`
///
/// The column list is read once and drives both the SELECT and the INSERT,
/// so tuples stay positionally aligned with the target column list. A window
/// whose insert fails is rolled back, reported and skipped; the copy then
/// moves on to the next window. Any other error aborts the copy.
pub async fn copy_table<W>(
    source: &Connection,
    target: &mut W,
    table: &str,
    batch_size: usize,
) -> Result<CopyStats>
where
    W: TargetWriter + ?Sized,
{
    if batch_size == 0 {
        bail!("Batch size must be greater than zero");
    }

    let columns: Vec<String> = reader::describe_columns(source, table)?
        .into_iter()
        .map(|column| column.name)
        .collect();
    let insert = InsertStatement::new(table, &columns);

    let total = reader::get_table_row_count(source, table)?;
    let progress = progress_bar(table, total);

    let mut stats = CopyStats::default();
    let mut offset = 0;

    loop {
        let window = reader::read_window(source, table, &columns, batch_size, offset)?;
        stats.windows_read += 1;

        if window.is_empty() {
            break;
        }

        let window_len = window.len();
        let params = window
            .into_iter()
            .map(converter::sqlite_row_to_params)
            .collect();

        match target.write_window(&insert, params).await? {
            WindowOutcome::Committed => stats.rows_committed += window_len,
            WindowOutcome::RolledBack { message } => {
                stats.windows_rolled_back += 1;
                let err = MigrationError::BatchInsert {
                    table: table.to_string(),
                    offset,
                    end: offset + window_len,
                    message,
                };
                progress.suspend(|| tracing::error!("{}", err));
            }
        }

        stats.rows_read += window_len;
        advance(&progress, window_len, stats.rows_read);
        offset += batch_size;
    }

    progress.finish();

    tracing::debug!("Copy of '{}' finished: {:?}", table, stats);

    Ok(stats)
}

fn progress_bar(table: &str, total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len} rows ({eta})")
    {
        progress.set_style(style.progress_chars("=>-"));
    }
    progress.set_message(format!("Copying {}", sanitize_identifier(table)));
    progress
}

/// Move the bar forward, stretching it when the counted total was stale
fn advance(progress: &ProgressBar, rows: usize, processed: usize) {
    if progress.length().is_some_and(|len| (processed as u64) > len) {
        progress.set_length(processed as u64);
    }
    progress.inc(rows as u64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::testing::RecordingTarget;
    use mysql_async::Value;

    fn source_with_rows(rows: usize) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE items (id INTEGER PRIMARY KEY, label TEXT)")
            .unwrap();
        let tx = conn.unchecked_transaction().unwrap();
        {
            let mut stmt = tx
                .prepare("INSERT INTO items (id, label) VALUES (?1, ?2)")
                .unwrap();
            for id in 1..=rows {
                stmt.execute(rusqlite::params![id as i64, format!("item-{}", id)])
                    .unwrap();
            }
        }
        tx.commit().unwrap();
        conn
    }

    #[tokio::test]
    async fn test_exact_window_multiple_reads_one_empty_window() {
        let source = source_with_rows(1000);
        let mut target = RecordingTarget::default();

        let stats = copy_table(&source, &mut target, "items", BATCH_SIZE)
            .await
            .unwrap();

        assert_eq!(stats.windows_read, 2);
        assert_eq!(target.window_sizes("items"), vec![1000]);
        assert_eq!(stats.rows_committed, 1000);
    }

    #[tokio::test]
    async fn test_one_row_past_window_needs_three_reads() {
        let source = source_with_rows(1001);
        let mut target = RecordingTarget::default();

        let stats = copy_table(&source, &mut target, "items", BATCH_SIZE)
            .await
            .unwrap();

        assert_eq!(stats.windows_read, 3);
        assert_eq!(target.window_sizes("items"), vec![1000, 1]);
        assert_eq!(stats.rows_read, 1001);
        assert_eq!(target.committed_rows("items").len(), 1001);
    }

    #[tokio::test]
    async fn test_empty_table_reads_once() {
        let source = source_with_rows(0);
        let mut target = RecordingTarget::default();

        let stats = copy_table(&source, &mut target, "items", BATCH_SIZE)
            .await
            .unwrap();

        assert_eq!(stats, CopyStats { windows_read: 1, ..CopyStats::default() });
        assert!(target.window_sizes("items").is_empty());
    }

    #[tokio::test]
    async fn test_failed_window_is_skipped() {
        let source = source_with_rows(25);
        let mut target = RecordingTarget::default().fail_window("items", 1);

        let stats = copy_table(&source, &mut target, "items", 10).await.unwrap();

        assert_eq!(stats.windows_read, 4);
        assert_eq!(stats.windows_rolled_back, 1);
        assert_eq!(stats.rows_read, 25);
        assert_eq!(stats.rows_committed, 15);

        let ids: Vec<i64> = target
            .committed_rows("items")
            .iter()
            .map(|row| match row[0] {
                Value::Int(id) => id,
                ref other => panic!("unexpected id value {:?}", other),
            })
            .collect();
        let expected: Vec<i64> = (1..=10).chain(21..=25).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_rows_follow_insert_column_order() {
        let source = source_with_rows(1);
        let mut target = RecordingTarget::default();

        copy_table(&source, &mut target, "items", BATCH_SIZE)
            .await
            .unwrap();

        assert_eq!(
            target.insert_columns("items"),
            Some(vec!["id".to_string(), "label".to_string()])
        );
        assert_eq!(
            target.committed_rows("items"),
            vec![vec![Value::Int(1), Value::Bytes(b"item-1".to_vec())]]
        );
    }

    #[tokio::test]
    async fn test_fatal_target_error_aborts_copy() {
        let source = source_with_rows(30);
        let mut target = RecordingTarget::default().break_connection_at("items", 1);

        let result = copy_table(&source, &mut target, "items", 10).await;

        assert!(result.is_err());
        // The first window stays committed
        assert_eq!(target.window_sizes("items"), vec![10]);
    }

    #[tokio::test]
    async fn test_missing_table_is_not_found() {
        let source = source_with_rows(0);
        let mut target = RecordingTarget::default();

        let err = copy_table(&source, &mut target, "ghost", BATCH_SIZE)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<MigrationError>(),
            Some(MigrationError::TableNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_zero_batch_size_rejected() {
        let source = source_with_rows(1);
        let mut target = RecordingTarget::default();

        assert!(copy_table(&source, &mut target, "items", 0).await.is_err());
    }

    #[test]
    fn test_progress_grows_past_stale_total() {
        let progress = ProgressBar::hidden();
        progress.set_length(5);

        advance(&progress, 5, 5);
        advance(&progress, 3, 8);

        assert_eq!(progress.position(), 8);
        assert_eq!(progress.length(), Some(8));
    }
}
