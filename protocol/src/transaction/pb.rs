//! Wire messages for transactions and states.
//!
//! The structs are plain prost messages, so anything that speaks protobuf
//! can decode what we store. Each one also implements
//! [`ProtoMessage`] so the canonical encoder can walk it. Keep the two in
//! sync: a field added to the struct but not to `fields()` is silently
//! left out of the transaction ID.
//!
//! prost drops fields it doesn't know while decoding. The canonical encoder
//! refuses unknown fields, so [`unknown_field_len`] counts them on the raw
//! bytes before anything is decoded and re-encoded.

use prost::encoding::{decode_key, decode_varint, WireType};
use prost::DecodeError;

use crate::encoding::{FieldDescriptor, FieldSet, ProtoMessage, Value};

#[derive(Clone, PartialEq, prost::Message)]
pub struct Transaction {
    #[prost(bytes = "vec", tag = "1")]
    pub salt: Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub inputs: Vec<StateReference>,
    #[prost(message, repeated, tag = "3")]
    pub references: Vec<StateReference>,
    #[prost(message, repeated, tag = "4")]
    pub outputs: Vec<State>,
    #[prost(message, repeated, tag = "5")]
    pub parameters: Vec<Parameter>,
    #[prost(message, repeated, tag = "6")]
    pub required_signers: Vec<Party>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct StateReference {
    #[prost(bytes = "vec", tag = "1")]
    pub txid: Vec<u8>,
    #[prost(uint64, tag = "2")]
    pub output_index: u64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct State {
    #[prost(message, optional, tag = "1")]
    pub info: Option<StateInfo>,
    #[prost(bytes = "vec", tag = "2")]
    pub state: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct StateInfo {
    #[prost(string, tag = "1")]
    pub kind: String,
    #[prost(message, repeated, tag = "2")]
    pub owners: Vec<Party>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Party {
    #[prost(bytes = "vec", tag = "1")]
    pub public_key: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Parameter {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Signature {
    #[prost(bytes = "vec", tag = "1")]
    pub public_key: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Reflection
// ---------------------------------------------------------------------------

impl ProtoMessage for Transaction {
    fn full_name(&self) -> &str {
        "strata.tx.v1.Transaction"
    }

    fn fields(&self) -> Vec<(FieldDescriptor, Value<'_>)> {
        FieldSet::new()
            .bytes(1, "salt", &self.salt)
            .messages(2, "inputs", &self.inputs)
            .messages(3, "references", &self.references)
            .messages(4, "outputs", &self.outputs)
            .messages(5, "parameters", &self.parameters)
            .messages(6, "required_signers", &self.required_signers)
            .finish()
    }
}

impl ProtoMessage for StateReference {
    fn full_name(&self) -> &str {
        "strata.tx.v1.StateReference"
    }

    fn fields(&self) -> Vec<(FieldDescriptor, Value<'_>)> {
        FieldSet::new()
            .bytes(1, "txid", &self.txid)
            .uint64(2, "output_index", self.output_index)
            .finish()
    }
}

impl ProtoMessage for State {
    fn full_name(&self) -> &str {
        "strata.tx.v1.State"
    }

    fn fields(&self) -> Vec<(FieldDescriptor, Value<'_>)> {
        FieldSet::new()
            .message(1, "info", self.info.as_ref())
            .bytes(2, "state", &self.state)
            .finish()
    }
}

impl ProtoMessage for StateInfo {
    fn full_name(&self) -> &str {
        "strata.tx.v1.StateInfo"
    }

    fn fields(&self) -> Vec<(FieldDescriptor, Value<'_>)> {
        FieldSet::new()
            .string(1, "kind", &self.kind)
            .messages(2, "owners", &self.owners)
            .finish()
    }
}

impl ProtoMessage for Party {
    fn full_name(&self) -> &str {
        "strata.tx.v1.Party"
    }

    fn fields(&self) -> Vec<(FieldDescriptor, Value<'_>)> {
        FieldSet::new()
            .bytes(1, "public_key", &self.public_key)
            .finish()
    }
}

impl ProtoMessage for Parameter {
    fn full_name(&self) -> &str {
        "strata.tx.v1.Parameter"
    }

    fn fields(&self) -> Vec<(FieldDescriptor, Value<'_>)> {
        FieldSet::new()
            .string(1, "name", &self.name)
            .bytes(2, "value", &self.value)
            .finish()
    }
}

impl ProtoMessage for Signature {
    fn full_name(&self) -> &str {
        "strata.tx.v1.Signature"
    }

    fn fields(&self) -> Vec<(FieldDescriptor, Value<'_>)> {
        FieldSet::new()
            .bytes(1, "public_key", &self.public_key)
            .bytes(2, "signature", &self.signature)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Unknown fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Schema {
    Transaction,
    StateReference,
    State,
    StateInfo,
    Party,
    Parameter,
}

impl Schema {
    /// `None` if `tag` isn't a field of this message, `Some(None)` for a
    /// scalar field, `Some(Some(child))` for an embedded message.
    fn field(self, tag: u32) -> Option<Option<Schema>> {
        use Schema::*;
        match (self, tag) {
            (Transaction, 1) => Some(None),
            (Transaction, 2 | 3) => Some(Some(StateReference)),
            (Transaction, 4) => Some(Some(State)),
            (Transaction, 5) => Some(Some(Parameter)),
            (Transaction, 6) => Some(Some(Party)),
            (StateReference, 1 | 2) => Some(None),
            (State, 1) => Some(Some(StateInfo)),
            (State, 2) => Some(None),
            (StateInfo, 1) => Some(None),
            (StateInfo, 2) => Some(Some(Party)),
            (Party, 1) => Some(None),
            (Parameter, 1 | 2) => Some(None),
            _ => None,
        }
    }
}

/// Total length, tags included, of the fields in an encoded [`Transaction`]
/// that the schema doesn't know, at any depth.
pub fn unknown_field_len(bytes: &[u8]) -> Result<usize, DecodeError> {
    unknown_in(Schema::Transaction, bytes)
}

fn unknown_in(schema: Schema, mut buf: &[u8]) -> Result<usize, DecodeError> {
    let mut unknown = 0;
    while !buf.is_empty() {
        let before = buf.len();
        let (tag, wire_type) = decode_key(&mut buf)?;
        let payload = match wire_type {
            WireType::Varint => {
                decode_varint(&mut buf)?;
                None
            }
            WireType::SixtyFourBit => {
                buf = split(buf, 8)?.1;
                None
            }
            WireType::ThirtyTwoBit => {
                buf = split(buf, 4)?.1;
                None
            }
            WireType::LengthDelimited => {
                let len = decode_varint(&mut buf)?;
                let len = usize::try_from(len).map_err(|_| DecodeError::new("length overflow"))?;
                let (payload, rest) = split(buf, len)?;
                buf = rest;
                Some(payload)
            }
            WireType::StartGroup | WireType::EndGroup => {
                return Err(DecodeError::new("groups are not supported"))
            }
        };

        match (schema.field(tag), payload) {
            (None, _) => unknown += before - buf.len(),
            (Some(Some(child)), Some(payload)) => unknown += unknown_in(child, payload)?,
            _ => {}
        }
    }
    Ok(unknown)
}

fn split(buf: &[u8], n: usize) -> Result<(&[u8], &[u8]), DecodeError> {
    if buf.len() < n {
        return Err(DecodeError::new("buffer underflow"));
    }
    Ok(buf.split_at(n))
}
