// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Strata Protocol - Core Library
//!
//! The transactional core of the Strata ledger. It answers four questions:
//!
//! 1. What exactly are the bytes of this transaction? (canonical encoding)
//! 2. What is its name? (salted two-level Merkle ID)
//! 3. Can it be applied, and what happens when it is? (submit / commit)
//! 4. Where does it sit in the global order? (total-order log)
//!
//! ## Architecture
//!
//! - **encoding** - deterministic protobuf marshaling over a small
//!   reflection trait. Byte-for-byte what a deterministic protobuf encoder
//!   produces, and loud about anything it can't make deterministic.
//! - **merkle** - RFC 6962 Merkle roots, printable trees, audit paths.
//! - **crypto** - pluggable SHA-2 hashing/HMAC and low-S secp256k1 ECDSA.
//! - **transaction** - wire messages, domain types, identity derivation.
//! - **storage** - KV interface (memory, sled) and the transaction repository.
//! - **validator** - the `Validator` seam and the built-in signature check.
//! - **submit** - resolve → validate → commit, with a halt-vs-reject taxonomy.
//! - **totalorder** - hash-chained sequence log and an in-process sequencer.
//! - **config** - protocol constants.
//!
//! ## Ground Rules
//!
//! 1. A transaction's ID and encoding are computed once and never change.
//! 2. A consumed state is never handed out as live again.
//! 3. Infrastructure failures halt; they are never quietly retried.
//! 4. Sequence numbers start at 0 and never skip.

pub mod config;
pub mod crypto;
pub mod encoding;
pub mod merkle;
pub mod storage;
pub mod submit;
pub mod totalorder;
pub mod transaction;
pub mod validator;
