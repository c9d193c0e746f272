//! # Cryptographic Primitives for Strata
//!
//! Two concerns live here:
//!
//! - **hash** - the pluggable SHA-2 [`HashAlgorithm`] used for Merkle roots,
//!   leaf salts (HMAC), receipts and the total-order accumulator.
//! - **ecdsa** - secp256k1 signing and verification with low-S
//!   normalization, used by the built-in signature validator.
//!
//! Everything is a thin, typed wrapper around audited RustCrypto crates.
//! If you're tempted to optimize these functions, please reconsider.

pub mod ecdsa;
pub mod hash;

pub use ecdsa::{EcdsaError, Keypair};
pub use hash::{sha256, HashAlgorithm, HashError};
