//! Errors shared by the KV stores and the transaction repository.

use crate::encoding::EncodeError;
use crate::transaction::IdentityError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The key is absent. Callers above the repository translate this
    /// into something meaningful ("missing state", "already exists", ...).
    #[error("not found: {0}")]
    NotFound(String),

    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("failed to reconstruct the transaction: {0}")]
    Identity(#[from] IdentityError),

    /// Data on disk does not match what its key promises.
    #[error("corrupted store: {0}")]
    Corrupted(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<bincode::Error> for StoreError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
