//! # Total Order
//!
//! A globally ordered log of transaction pointers.
//!
//! ```text
//! entry.rs     - TxIdAndHmac, the fixed 64-byte log entry
//! store.rs     - TotalOrderStore: sequencing, hash chain, blocking reads
//! sequencer.rs - InProcessSequencer: one task feeding the store
//! ```
//!
//! Entries carry no transaction content, only an ID and a namespace HMAC,
//! so the log can be shared between namespaces that can't see each other's
//! transactions.

pub mod entry;
pub mod error;
pub mod sequencer;
pub mod store;

pub use entry::TxIdAndHmac;
pub use error::{TotalOrderError, TotalOrderResult};
pub use sequencer::InProcessSequencer;
pub use store::TotalOrderStore;
