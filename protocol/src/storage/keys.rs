//! Key layout of the `ledger` tree.
//!
//! ```text
//! 0x01 || txid                     → encoded transaction
//! 0x02 || txid || BE64(index)      → live state data
//! 0x03 || txid || BE64(index)      → encoded StateInfo
//! 0x04 || txid || BE64(index)      → consumed state data
//! 0x05 || receipt id               → bincode(Receipt)
//! 0x06 || txid                     → bincode(Committed)
//! ```
//!
//! Fixed-width big-endian indexes keep all outputs of a transaction
//! adjacent and in order under a prefix scan.

use crate::transaction::{Id, StateId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrefix {
    Transaction,
    State,
    StateInfo,
    ConsumedState,
    Receipt,
    Commit,
}

impl KeyPrefix {
    pub const fn byte(self) -> u8 {
        match self {
            Self::Transaction => 0x01,
            Self::State => 0x02,
            Self::StateInfo => 0x03,
            Self::ConsumedState => 0x04,
            Self::Receipt => 0x05,
            Self::Commit => 0x06,
        }
    }
}

fn id_key(prefix: KeyPrefix, id: &Id) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + id.as_bytes().len());
    key.push(prefix.byte());
    key.extend_from_slice(id.as_bytes());
    key
}

fn state_id_key(prefix: KeyPrefix, id: &StateId) -> Vec<u8> {
    let txid = id.txid.as_bytes();
    let mut key = Vec::with_capacity(1 + txid.len() + 8);
    key.push(prefix.byte());
    key.extend_from_slice(txid);
    key.extend_from_slice(&id.output_index.to_be_bytes());
    key
}

pub fn transaction_key(txid: &Id) -> Vec<u8> {
    id_key(KeyPrefix::Transaction, txid)
}

pub fn state_key(id: &StateId) -> Vec<u8> {
    state_id_key(KeyPrefix::State, id)
}

pub fn state_info_key(id: &StateId) -> Vec<u8> {
    state_id_key(KeyPrefix::StateInfo, id)
}

pub fn consumed_state_key(id: &StateId) -> Vec<u8> {
    state_id_key(KeyPrefix::ConsumedState, id)
}

pub fn receipt_key(receipt_id: &Id) -> Vec<u8> {
    id_key(KeyPrefix::Receipt, receipt_id)
}

pub fn commit_key(txid: &Id) -> Vec<u8> {
    id_key(KeyPrefix::Commit, txid)
}
