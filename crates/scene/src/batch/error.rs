use thiserror::Error;

pub type Result<T> = std::result::Result<T, BosBatchError>;

#[derive(Error, Debug)]
pub enum BosBatchError {
    #[error(
        "[batch] merge group for material {material} exceeds addressable buffers: \
         {vertices} vertices, {indices} indices"
    )]
    CapacityExceeded {
        material: i32,
        vertices: u64,
        indices: u64,
    },

    #[error("[batch] geometry queued for material {material} has a malformed position buffer ({len} floats)")]
    MergeAttributeMismatch { material: i32, len: usize },

    #[error("[batch] transform index out of range: {index} (table length {len})")]
    TransformIndexOutOfRange { index: usize, len: usize },
}
