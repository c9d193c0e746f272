//! # Validators
//!
//! A validator looks at a [`Resolved`] transaction and says yes or no.
//! It must be a pure function of what it is handed: no clocks, no lookups,
//! no state carried between calls. Anything it needs has to be in the
//! resolved transaction already.
//!
//! Two outcomes that look alike are kept apart on purpose:
//!
//! - `Ok(Verdict { valid: false, .. })` is a business answer. The
//!   transaction is rejected and that's the end of it.
//! - `Err(ValidatorError)` means the validator itself broke. The pipeline
//!   treats that as a halt.
//!
//! Closures `Fn(&Resolved) -> Result<Verdict, ValidatorError>` are
//! validators too, which keeps tests short.

pub mod signature;

pub use signature::SignatureValidator;

use thiserror::Error;

use crate::transaction::Resolved;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub valid: bool,
    pub error_message: Option<String>,
}

impl Verdict {
    pub fn valid() -> Self {
        Self {
            valid: true,
            error_message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error_message: Some(message.into()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("validator failed: {0}")]
    Failed(String),
}

pub trait Validator: Send + Sync {
    fn validate(&self, resolved: &Resolved) -> Result<Verdict, ValidatorError>;
}

impl<F> Validator for F
where
    F: Fn(&Resolved) -> Result<Verdict, ValidatorError> + Send + Sync,
{
    fn validate(&self, resolved: &Resolved) -> Result<Verdict, ValidatorError> {
        self(resolved)
    }
}
