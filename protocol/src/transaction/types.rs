//! Domain types for transactions and ledger states.
//!
//! These are the owned, decoded counterparts of the [`pb`](super::pb)
//! messages. The pipeline, the repository and validators all speak these
//! types; protobuf only shows up at the storage and identity boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::pb;

// ---------------------------------------------------------------------------
// Id
// ---------------------------------------------------------------------------

/// Opaque identifier: a transaction ID or a receipt ID.
///
/// Equality is byte equality. Prints as lowercase hex.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Id(Vec<u8>);

impl Id {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(s).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Id {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Id {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", short_hex(&self.0))
    }
}

/// Hex with the middle elided for anything longer than 32 bytes.
pub fn short_hex(bytes: &[u8]) -> String {
    const KEEP: usize = 15;
    if bytes.len() <= 32 {
        return hex::encode(bytes);
    }
    format!(
        "{}....{}",
        hex::encode(&bytes[..KEEP]),
        hex::encode(&bytes[bytes.len() - KEEP..])
    )
}

// ---------------------------------------------------------------------------
// StateId
// ---------------------------------------------------------------------------

/// One output slot of a transaction.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct StateId {
    pub txid: Id,
    pub output_index: u64,
}

impl StateId {
    pub fn new(txid: Id, output_index: u64) -> Self {
        Self { txid, output_index }
    }

    pub fn to_pb(&self) -> pb::StateReference {
        pb::StateReference {
            txid: self.txid.as_bytes().to_vec(),
            output_index: self.output_index,
        }
    }
}

impl From<&pb::StateReference> for StateId {
    fn from(r: &pb::StateReference) -> Self {
        Self::new(Id::new(r.txid.clone()), r.output_index)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:016x}", self.txid, self.output_index)
    }
}

// ---------------------------------------------------------------------------
// Party / StateInfo / State
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Party {
    pub public_key: Vec<u8>,
}

impl Party {
    pub fn new(public_key: impl Into<Vec<u8>>) -> Self {
        Self {
            public_key: public_key.into(),
        }
    }

    pub fn to_pb(&self) -> pb::Party {
        pb::Party {
            public_key: self.public_key.clone(),
        }
    }
}

impl From<&pb::Party> for Party {
    fn from(p: &pb::Party) -> Self {
        Self::new(p.public_key.clone())
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&short_hex(&self.public_key))
    }
}

/// What a state is and who may spend it.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct StateInfo {
    pub kind: String,
    pub owners: Vec<Party>,
}

impl StateInfo {
    pub fn to_pb(&self) -> pb::StateInfo {
        pb::StateInfo {
            owners: self.owners.iter().map(Party::to_pb).collect(),
            kind: self.kind.clone(),
        }
    }
}

impl From<&pb::StateInfo> for StateInfo {
    fn from(info: &pb::StateInfo) -> Self {
        Self {
            kind: info.kind.clone(),
            owners: info.owners.iter().map(Party::from).collect(),
        }
    }
}

/// Immutable unit of ledger content. Born as a transaction output, later
/// referenced or consumed.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    pub info: StateInfo,
    pub data: Vec<u8>,
}

impl State {
    /// Output `index` of transaction `txid`, built from its wire form.
    /// A missing `info` reads as the default.
    pub fn from_output(txid: &Id, index: u64, output: &pb::State) -> Self {
        Self {
            id: StateId::new(txid.clone(), index),
            info: output.info.as_ref().map(StateInfo::from).unwrap_or_default(),
            data: output.state.clone(),
        }
    }

    pub fn to_pb(&self) -> pb::State {
        pb::State {
            info: Some(self.info.to_pb()),
            state: self.data.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parameter / Signature
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: Vec<u8>,
}

impl From<&pb::Parameter> for Parameter {
    fn from(p: &pb::Parameter) -> Self {
        Self {
            name: p.name.clone(),
            value: p.value.clone(),
        }
    }
}

/// An unverified claim that `public_key` signed something. Checking it is
/// the validator's job.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Signature {
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
}

impl Signature {
    pub fn new(public_key: impl Into<Vec<u8>>, signature: impl Into<Vec<u8>>) -> Self {
        Self {
            public_key: public_key.into(),
            signature: signature.into(),
        }
    }

    pub fn to_pb(&self) -> pb::Signature {
        pb::Signature {
            public_key: self.public_key.clone(),
            signature: self.signature.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline records
// ---------------------------------------------------------------------------

/// A transaction with every input and reference replaced by the state it
/// points to. This is the only shape a validator ever sees.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Resolved {
    pub id: Id,
    pub inputs: Vec<State>,
    pub references: Vec<State>,
    pub outputs: Vec<State>,
    pub parameters: Vec<Parameter>,
    pub required_signers: Vec<Party>,
    pub signatures: Vec<Signature>,
}

/// Durable marker that a transaction went through.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Committed {
    pub seq_no: u64,
    pub receipt_id: Id,
}
