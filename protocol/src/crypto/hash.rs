//! # Hashing Utilities
//!
//! Every hash in Strata goes through [`HashAlgorithm`]: Merkle roots,
//! per-leaf HMAC salts, the total-order accumulator, receipt IDs. One
//! ledger uses one algorithm throughout. Mixing them inside a single root
//! computation produces garbage that merely looks like a hash.
//!
//! We support the SHA-2 family and nothing else:
//!
//! - **SHA-256** is the default. 32-byte output, which is also what the
//!   total-order log's fixed entry layout assumes.
//! - **SHA-224 / SHA-384 / SHA-512** for deployments that want a different
//!   output size. Merkle roots and transaction IDs are fine with any of
//!   them; total-order entries are not (they must be 32 bytes).
//!
//! ## HMAC
//!
//! Per-leaf salts are `HMAC(key = transaction salt, msg = field || index)`
//! using the same algorithm as the tree. HMAC takes keys of any length, so
//! the `InvalidKeyLength` error exists only because the `hmac` crate's API
//! is fallible in general.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

/// Errors from hash construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashError {
    #[error("invalid HMAC key length")]
    InvalidKeyLength,

    #[error("unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),
}

/// A pluggable, fixed-output-length hash constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha224,
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Digest length in bytes.
    pub fn output_size(self) -> usize {
        match self {
            HashAlgorithm::Sha224 => 28,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        self.digest_parts(&[data])
    }

    /// Hash several byte slices as if they were concatenated, without
    /// building the concatenation.
    pub fn digest_parts(self, parts: &[&[u8]]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha224 => digest_with::<Sha224>(parts),
            HashAlgorithm::Sha256 => digest_with::<Sha256>(parts),
            HashAlgorithm::Sha384 => digest_with::<Sha384>(parts),
            HashAlgorithm::Sha512 => digest_with::<Sha512>(parts),
        }
    }

    /// HMAC over the concatenation of `parts`, keyed with `key`.
    pub fn hmac(self, key: &[u8], parts: &[&[u8]]) -> Result<Vec<u8>, HashError> {
        macro_rules! hmac_with {
            ($digest:ty) => {{
                let mut mac = <Hmac<$digest> as Mac>::new_from_slice(key)
                    .map_err(|_| HashError::InvalidKeyLength)?;
                for part in parts {
                    mac.update(part);
                }
                mac.finalize().into_bytes().to_vec()
            }};
        }

        Ok(match self {
            HashAlgorithm::Sha224 => hmac_with!(Sha224),
            HashAlgorithm::Sha256 => hmac_with!(Sha256),
            HashAlgorithm::Sha384 => hmac_with!(Sha384),
            HashAlgorithm::Sha512 => hmac_with!(Sha512),
        })
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(HashError::UnknownAlgorithm(s.to_string())),
        }
    }
}

fn digest_with<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

/// Compute the SHA-256 hash of the input data.
///
/// Signatures are made over `sha256(txid)` regardless of the ledger's
/// configured algorithm, so this stays a standalone helper.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}
