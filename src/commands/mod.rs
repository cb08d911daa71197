// ABOUTME: Command implementations for the migration tool
// ABOUTME: Exports the migrate command

pub mod migrate;

pub use migrate::migrate;
