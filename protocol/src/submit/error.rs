//! Outcome taxonomy of the commit pipeline.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::encoding::EncodeError;
use crate::storage::StoreError;
use crate::transaction::Id;

/// Where a transaction was in the pipeline when something happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Resolving,
    Validating,
    Committing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Received => write!(f, "received"),
            Self::Resolving => write!(f, "resolving"),
            Self::Validating => write!(f, "validating"),
            Self::Committing => write!(f, "committing"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    /// The same transaction came in twice. Reported, never retried.
    #[error("transaction {0} already exists")]
    AlreadyExists(Id),

    /// An input or reference does not exist (or was already consumed).
    #[error("missing state for transaction {txid}: {source}")]
    MissingState {
        txid: Id,
        #[source]
        source: StoreError,
    },

    /// The validator said no.
    #[error("validation failed{}", reason_suffix(.reason))]
    Rejected { reason: Option<String> },

    /// Infrastructure failure. Stop and get an operator; earlier commit
    /// steps are not rolled back.
    #[error("halt processing: {context}: {source}")]
    Halt {
        stage: Stage,
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error(transparent)]
    Encoding(#[from] EncodeError),
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(": {r}"),
        None => String::new(),
    }
}

impl SubmitError {
    pub(crate) fn halt(
        stage: Stage,
        context: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Halt {
            stage,
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn is_halt(&self) -> bool {
        matches!(self, Self::Halt { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MissingState { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// The stage a halt happened in.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Halt { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type SubmitResult<T> = Result<T, SubmitError>;
