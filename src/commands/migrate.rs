// ABOUTME: Migrate command: opens both databases and runs the two-pass migration
// ABOUTME: Owns the lifetime of the source and target connections

use crate::migration::{run_migration, BATCH_SIZE};
use crate::mysql::{writer::MysqlTarget, TargetOptions};
use crate::sqlite;
use anyhow::{Context, Result};

/// Migrate every table of the SQLite file at `sqlite_path` into the target
///
/// Opens one source and one target connection, runs the migration with the
/// fixed window size and closes both. A fatal error returns early and leaves
/// the connections to be dropped.
pub async fn migrate(sqlite_path: &str, target: &TargetOptions) -> Result<()> {
    let source = sqlite::open_sqlite(sqlite_path)?;
    let mut target = MysqlTarget::connect(target).await?;

    let reports = run_migration(&source, &mut target, BATCH_SIZE).await?;

    tracing::debug!("Migrated {} tables", reports.len());

    target.disconnect().await?;
    source
        .close()
        .map_err(|(_, e)| e)
        .context("Failed to close SQLite database")?;

    Ok(())
}
