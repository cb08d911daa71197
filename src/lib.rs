// ABOUTME: Library module for sqlite-mysql-migrator
// ABOUTME: Exports all core functionality for use in binary and tests

pub mod commands;
pub mod error;
pub mod migration;
pub mod mysql;
pub mod sqlite;
pub mod utils;

pub use error::MigrationError;
