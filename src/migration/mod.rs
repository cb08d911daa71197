// ABOUTME: Migration pipeline module
// ABOUTME: Schema translation, windowed data copy, and the two-pass driver

pub mod copy;
pub mod pipeline;
pub mod schema;

#[cfg(test)]
pub(crate) mod testing;

pub use copy::{copy_table, CopyStats, BATCH_SIZE};
pub use pipeline::{run_migration, TableReport};
pub use schema::{
    build_column_clause, build_create_table, create_table, translate_type, ColumnDescriptor,
    TargetColumnType,
};
