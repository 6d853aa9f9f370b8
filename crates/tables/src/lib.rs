//! Typed access to BIM Open Schema geometry tables.
//!
//! The tables arrive as flat columns from an external columnar reader
//! (parquet, zip, in-memory, ...). This crate validates them and exposes
//! typed accessors; it knows nothing about batching or rendering.

pub mod columns;
pub mod error;
pub mod source;

pub use columns::{
    checked_index, GeometryTables, IndexTable, InstanceTable, MaterialTable, MeshTable,
    TransformTable, VertexTable,
};
pub use error::BosTableError;
pub use source::ColumnSource;
