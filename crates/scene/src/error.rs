use bos_tables::BosTableError;
use thiserror::Error;

use crate::batch::BosBatchError;
use crate::scene::BosSceneError;

#[derive(Error, Debug)]
pub enum BosError {
    #[error("{0}")]
    Table(#[from] BosTableError),

    #[error("{0}")]
    Batch(#[from] BosBatchError),

    #[error("{0}")]
    Scene(#[from] BosSceneError),
}

pub type Result<T> = std::result::Result<T, BosError>;
