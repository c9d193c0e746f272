//! # Canonical Encoding
//!
//! Transaction IDs are hashes over encoded messages, and storage keys are
//! derived from those IDs. If two nodes encode the same logical message to
//! different bytes, they disagree on what the transaction *is*. This module
//! makes sure that can't happen.
//!
//! ## Architecture
//!
//! ```text
//! reflect.rs  - ProtoMessage trait, field descriptors, borrowed values
//! wire.rs     - varint/tag helpers (prost) and the LengthMarker
//! encoder.rs  - marshal_deterministic
//! validate.rs - refusal checks without marshaling
//! dynamic.rs  - DynamicMessage for schema-less use
//! ```
//!
//! The output is byte-identical to a standard deterministic protobuf
//! encoding for the messages we use, which means any off-the-shelf decoder
//! (prost included) reads it back.

pub mod dynamic;
pub mod encoder;
pub mod error;
pub mod reflect;
pub mod validate;
pub mod wire;

pub use dynamic::{DynamicKey, DynamicMessage, DynamicValue};
pub use encoder::{marshal_deterministic, marshal_into};
pub use error::{EncodeError, EncodeResult};
pub use reflect::{Cardinality, FieldDescriptor, FieldSet, Kind, MapKey, Oneof, ProtoMessage, Syntax, Value};
pub use validate::validate_message;
