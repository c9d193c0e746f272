//! Receipts: proof that a transaction was seen and endorsed before commit.

use serde::{Deserialize, Serialize};

use super::types::{Id, Signature};
use crate::crypto::HashAlgorithm;
use crate::encoding::{marshal_deterministic, EncodeResult};
use crate::merkle;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: Id,
    pub txid: Id,
    pub signatures: Vec<Signature>,
}

impl Receipt {
    /// The receipt ID is the Merkle root over the txid followed by the
    /// canonical encoding of each signature, in the order given.
    pub fn new(hash: HashAlgorithm, txid: &Id, signatures: &[Signature]) -> EncodeResult<Self> {
        let mut leaves = Vec::with_capacity(signatures.len() + 1);
        leaves.push(txid.as_bytes().to_vec());
        for sig in signatures {
            leaves.push(marshal_deterministic(&sig.to_pb())?);
        }

        Ok(Self {
            id: Id::new(merkle::root(hash, &leaves)),
            txid: txid.clone(),
            signatures: signatures.to_vec(),
        })
    }
}
