use crate::storage::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum TotalOrderError {
    #[error(transparent)]
    Store(StoreError),

    #[error("could not persist tx at seq {seq}: {source}")]
    Persist {
        seq: u64,
        #[source]
        source: StoreError,
    },

    #[error("could not get key for seq {seq}: {source}")]
    Read {
        seq: u64,
        #[source]
        source: StoreError,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("told to exit")]
    Stopped,

    #[error("corrupted total order log: {0}")]
    Corrupted(String),
}

pub type TotalOrderResult<T> = Result<T, TotalOrderError>;
