use thiserror::Error;

pub type Result<T> = std::result::Result<T, BosTableError>;

#[derive(Error, Debug)]
pub enum BosTableError {
    #[error("[table] {table} is missing required column {column}")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("[table] {table}.{column} has length {actual}, expected {expected}")]
    LengthMismatch {
        table: &'static str,
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("[table] Meshes.{column} is not monotonic at row {row}: {prev} > {next}")]
    OffsetNotMonotonic {
        column: &'static str,
        row: usize,
        prev: i32,
        next: i32,
    },

    #[error("[table] Meshes.{column} row {row} is out of range: {offset} (table length {len})")]
    OffsetOutOfRange {
        column: &'static str,
        row: usize,
        offset: i32,
        len: usize,
    },

    #[error("[table] column source: {0}")]
    Source(#[from] anyhow::Error),
}
