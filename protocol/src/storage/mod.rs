//! # Storage Module
//!
//! Persistence for transactions, states, receipts and commit markers.
//!
//! ## Architecture
//!
//! ```text
//! kv.rs         - Kv trait, WriteBatch, in-memory backend
//! db.rs         - sled backend (LedgerDb, SledKv)
//! keys.rs       - one-byte prefixed key layout of the ledger tree
//! repository.rs - Repository trait and TransactionRepository
//! error.rs      - StoreError
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! Committer → Repository → Kv ─┬─ MemoryKv
//!                               └─ SledKv (LedgerDb "ledger" tree)
//! ```
//!
//! Transactions are stored in their canonical protobuf encoding and
//! re-identified on every read. Receipts and commit markers are bincode.

pub mod db;
pub mod error;
pub mod keys;
pub mod kv;
pub mod repository;

pub use db::{LedgerDb, SledKv};
pub use error::{StoreError, StoreResult};
pub use keys::KeyPrefix;
pub use kv::{BatchOp, Kv, MemoryKv, WriteBatch};
pub use repository::{Repository, TransactionRepository};
