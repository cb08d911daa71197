// ABOUTME: In-memory TargetWriter double for pipeline unit tests
// ABOUTME: Records DDL and windows and can simulate insert or connection failures

use crate::mysql::writer::{InsertStatement, TargetWriter, WindowOutcome};
use anyhow::{bail, Result};
use async_trait::async_trait;
use mysql_async::Value;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct RecordingTarget {
    /// DDL and window events in call order, e.g. `ddl:users`, `window:users`
    pub events: Vec<String>,
    pub ddl: Vec<String>,
    windows: HashMap<String, Vec<usize>>,
    committed: HashMap<String, Vec<Vec<Value>>>,
    columns: HashMap<String, Vec<String>>,
    attempts: HashMap<String, usize>,
    fail: Vec<(String, usize)>,
    broken: Vec<(String, usize)>,
}

impl RecordingTarget {
    /// Roll back the window with this zero-based index
    pub fn fail_window(mut self, table: &str, index: usize) -> Self {
        self.fail.push((table.to_string(), index));
        self
    }

    /// Return a fatal error for the window with this zero-based index
    pub fn break_connection_at(mut self, table: &str, index: usize) -> Self {
        self.broken.push((table.to_string(), index));
        self
    }

    pub fn window_sizes(&self, table: &str) -> Vec<usize> {
        self.windows.get(table).cloned().unwrap_or_default()
    }

    pub fn committed_rows(&self, table: &str) -> Vec<Vec<Value>> {
        self.committed.get(table).cloned().unwrap_or_default()
    }

    pub fn insert_columns(&self, table: &str) -> Option<Vec<String>> {
        self.columns.get(table).cloned()
    }
}

#[async_trait]
impl TargetWriter for RecordingTarget {
    async fn execute_ddl(&mut self, sql: &str) -> Result<()> {
        let table = sql
            .split('`')
            .nth(1)
            .unwrap_or_default()
            .to_string();
        self.events.push(format!("ddl:{}", table));
        self.ddl.push(sql.to_string());
        Ok(())
    }

    async fn write_window(
        &mut self,
        insert: &InsertStatement,
        rows: Vec<Vec<Value>>,
    ) -> Result<WindowOutcome> {
        let table = insert.table().to_string();
        let attempt = self.attempts.entry(table.clone()).or_insert(0);
        let index = *attempt;
        *attempt += 1;

        let key = (table.clone(), index);
        if self.broken.contains(&key) {
            bail!("connection to target lost");
        }

        self.events.push(format!("window:{}", table));
        self.columns
            .insert(table.clone(), insert.columns().to_vec());
        self.windows.entry(table.clone()).or_default().push(rows.len());

        if self.fail.contains(&key) {
            return Ok(WindowOutcome::RolledBack {
                message: format!("simulated failure in window {}", index),
            });
        }

        self.committed.entry(table).or_default().extend(rows);
        Ok(WindowOutcome::Committed)
    }
}
