//! Entries of the total-order log.

use std::fmt;

use crate::config::{TOTAL_ORDER_ENTRY_LENGTH, TOTAL_ORDER_PART_LENGTH};
use crate::crypto::{HashAlgorithm, HashError};
use crate::transaction::{short_hex, Id};

/// A transaction ID paired with a namespace HMAC over it.
///
/// Members of a namespace know its key, so they can recognise their own
/// entries in the shared log. Everyone else sees two opaque hashes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TxIdAndHmac {
    pub id: Vec<u8>,
    pub hmac: Vec<u8>,
}

impl TxIdAndHmac {
    pub fn new(id: impl Into<Vec<u8>>, hmac: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            hmac: hmac.into(),
        }
    }

    /// Tags `txid` with `HMAC(key; txid)`.
    pub fn for_namespace(hash: HashAlgorithm, key: &[u8], txid: &Id) -> Result<Self, HashError> {
        let hmac = hash.hmac(key, &[txid.as_bytes()])?;
        Ok(Self::new(txid.as_bytes(), hmac))
    }

    /// Fixed 64-byte form: `id || hmac`.
    ///
    /// # Panics
    ///
    /// If either half is not exactly 32 bytes. Entries of any other size
    /// must never reach the log.
    pub fn to_bytes(&self) -> [u8; TOTAL_ORDER_ENTRY_LENGTH] {
        assert_eq!(
            self.id.len(),
            TOTAL_ORDER_PART_LENGTH,
            "total order entry id must be {TOTAL_ORDER_PART_LENGTH} bytes"
        );
        assert_eq!(
            self.hmac.len(),
            TOTAL_ORDER_PART_LENGTH,
            "total order entry hmac must be {TOTAL_ORDER_PART_LENGTH} bytes"
        );

        let mut out = [0u8; TOTAL_ORDER_ENTRY_LENGTH];
        out[..TOTAL_ORDER_PART_LENGTH].copy_from_slice(&self.id);
        out[TOTAL_ORDER_PART_LENGTH..].copy_from_slice(&self.hmac);
        out
    }

    /// # Panics
    ///
    /// If `bytes` is not exactly 64 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert_eq!(
            bytes.len(),
            TOTAL_ORDER_ENTRY_LENGTH,
            "total order entry must be {TOTAL_ORDER_ENTRY_LENGTH} bytes"
        );
        let (id, hmac) = bytes.split_at(TOTAL_ORDER_PART_LENGTH);
        Self::new(id, hmac)
    }
}

impl fmt::Debug for TxIdAndHmac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxIdAndHmac")
            .field("id", &short_hex(&self.id))
            .field("hmac", &short_hex(&self.hmac))
            .finish()
    }
}
