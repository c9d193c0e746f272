//! # Submit / Commit Pipeline
//!
//! Takes a transaction from "someone handed it to us" to "its outputs are
//! live and its inputs are spent", or explains why not.
//!
//! ## Architecture
//!
//! ```text
//! committer.rs - Committer: one pipeline, two triggers (direct, receipt)
//! namespace.rs - Namespace::submit: store, receipt, commit by receipt
//! error.rs     - SubmitError taxonomy and pipeline stages
//! ```
//!
//! ## Outcomes
//!
//! | Outcome         | Meaning                               | Retry?            |
//! |-----------------|---------------------------------------|-------------------|
//! | `Ok(())`        | committed                             | n/a               |
//! | `AlreadyExists` | duplicate submission                  | no                |
//! | `MissingState`  | an input/reference isn't there        | maybe, later      |
//! | `Rejected`      | validator said `valid: false`         | no                |
//! | `Halt`          | storage or validator broke            | operator decides  |

pub mod committer;
pub mod error;
pub mod namespace;

pub use crate::storage::Repository;
pub use committer::{Committer, Trigger};
pub use error::{Stage, SubmitError, SubmitResult};
pub use namespace::Namespace;
