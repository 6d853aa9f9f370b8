use thiserror::Error;

use super::mesh::MeshKey;

pub type Result<T> = std::result::Result<T, BosSceneError>;

#[derive(Error, Debug)]
pub enum BosSceneError {
    #[error("[scene] mesh not found: {0:?}")]
    MeshNotFound(MeshKey),

    #[error("[scene] face lookup requires a merged mesh")]
    NotMerged,

    #[error("[scene] sub-mesh slot {slot} out of range (count {count})")]
    SlotOutOfRange { slot: usize, count: usize },

    #[error("[scene] face {face} out of range (index count {index_count})")]
    FaceOutOfRange { face: u32, index_count: usize },
}
