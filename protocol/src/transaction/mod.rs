//! # Transaction Module
//!
//! Wire messages, domain types, and the derivation of a transaction's
//! identity and canonical encoding.
//!
//! ## Architecture
//!
//! ```text
//! pb.rs       - prost wire messages (also walkable by the canonical encoder)
//! types.rs    - Id, StateId, Party, State, Resolved, Committed, ...
//! identity.rs - Transaction::new: salted two-level Merkle ID + Encoded
//! receipt.rs  - Receipt and its ID
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build** - a `pb::Transaction` is assembled outside this crate.
//! 2. **Identify** - [`Transaction::new`] derives `id` and `encoded` once.
//! 3. **Submit** - a [`Signed`] transaction enters the commit pipeline.
//! 4. **Resolve** - the pipeline builds a transient [`Resolved`] for the validator.
//! 5. **Commit** - outputs become live states, a [`Committed`] marker is written.

pub mod identity;
pub mod pb;
pub mod receipt;
pub mod types;

pub use identity::{IdentityError, Signed, Transaction};
pub use receipt::Receipt;
pub use types::{
    short_hex, Committed, Id, Parameter, Party, Resolved, Signature, State, StateId, StateInfo,
};
