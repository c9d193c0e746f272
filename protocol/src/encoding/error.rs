//! Errors raised by the canonical encoder and the message validator.

use super::reflect::Kind;

/// Everything that can stop a message from being canonically encoded.
///
/// None of these are recoverable. A message that trips one of them has no
/// canonical encoding, and so no stable hash and no transaction ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("proto2 syntax is not supported")]
    UnsupportedSyntax,

    #[error("no support for message_set_wire_format")]
    MessageSet,

    #[error("proto2 groups are not supported")]
    GroupsUnsupported,

    #[error("refusing to marshal unknown fields with length {len}")]
    UnknownFields { len: usize },

    #[error("field {field} contains invalid UTF-8")]
    InvalidUtf8 { field: String },

    #[error("invalid kind {kind:?} for field {field}")]
    InvalidKind { field: String, kind: Kind },

    /// The value handed over by a message's reflection does not fit the
    /// kind its descriptor declares. Always a bug in a `ProtoMessage` impl.
    #[error("field {field} holds a value that does not match its declared kind {kind:?}")]
    KindMismatch { field: String, kind: Kind },
}

pub type EncodeResult<T> = Result<T, EncodeError>;
