//! # Deterministic Marshaling
//!
//! Protobuf's "deterministic" mode is documented as stable within one build
//! of one library and nothing more. Transaction IDs and storage keys need
//! more than that, so the encoding lives here where nobody's upstream
//! release can change it.
//!
//! ## Output order
//!
//! Populated fields are sorted with [`FieldDescriptor::canonical_cmp`]:
//! extensions first, then plain fields by number, then oneof members grouped
//! by oneof. Map entries are sorted by key. Packable repeated scalars are
//! packed under a single tag.
//!
//! ## Refusals
//!
//! proto2 messages, MessageSet, groups, unknown fields and invalid UTF-8 are
//! all hard errors. The point is that nothing we can't see survives into a
//! hashed byte string.

use prost::encoding::WireType;

use super::error::{EncodeError, EncodeResult};
use super::reflect::{Cardinality, FieldDescriptor, Kind, MapKey, ProtoMessage, Syntax, Value};
use super::wire::{
    put_bytes, put_fixed32, put_fixed64, put_tag, put_varint, wire_type, zigzag, LengthMarker,
};

/// Canonically encode `message`.
pub fn marshal_deterministic(message: &dyn ProtoMessage) -> EncodeResult<Vec<u8>> {
    let mut buf = Vec::new();
    marshal_into(&mut buf, message)?;
    Ok(buf)
}

/// Canonically encode `message`, appending to `buf`. On error `buf` holds
/// a partial encoding and should be thrown away.
pub fn marshal_into(buf: &mut Vec<u8>, message: &dyn ProtoMessage) -> EncodeResult<()> {
    if message.syntax() == Syntax::Proto2 {
        return Err(EncodeError::UnsupportedSyntax);
    }
    if message.is_message_set() {
        return Err(EncodeError::MessageSet);
    }

    let mut fields = message.fields();
    fields.sort_by(|(a, _), (b, _)| a.canonical_cmp(b));

    for (fd, value) in &fields {
        let field = FieldRef {
            message: message.full_name(),
            descriptor: fd,
        };
        marshal_field(buf, &field, value)?;
    }

    let unknown = message.unknown_fields();
    if !unknown.is_empty() {
        return Err(EncodeError::UnknownFields { len: unknown.len() });
    }
    Ok(())
}

/// A field plus the message it belongs to, so errors can name it.
struct FieldRef<'a> {
    message: &'a str,
    descriptor: &'a FieldDescriptor,
}

impl FieldRef<'_> {
    fn full_name(&self) -> String {
        format!("{}.{}", self.message, self.descriptor.name)
    }

    fn mismatch(&self, kind: Kind) -> EncodeError {
        EncodeError::KindMismatch {
            field: self.full_name(),
            kind,
        }
    }
}

fn marshal_field(buf: &mut Vec<u8>, field: &FieldRef<'_>, value: &Value<'_>) -> EncodeResult<()> {
    let fd = field.descriptor;
    match (fd.cardinality, value) {
        (Cardinality::Repeated { packed }, Value::List(items)) => {
            marshal_list(buf, field, packed, items)
        }
        (Cardinality::Map { key, value: val }, Value::Map(entries)) => {
            marshal_map(buf, field, key, val, entries)
        }
        (Cardinality::Singular, _) => {
            put_tag(buf, fd.number, tag_type(field, fd.kind)?);
            marshal_singular(buf, field, fd.kind, value)
        }
        _ => Err(field.mismatch(fd.kind)),
    }
}

fn tag_type(field: &FieldRef<'_>, kind: Kind) -> EncodeResult<WireType> {
    wire_type(kind).ok_or_else(|| EncodeError::InvalidKind {
        field: field.full_name(),
        kind,
    })
}

fn marshal_list(
    buf: &mut Vec<u8>,
    field: &FieldRef<'_>,
    packed: bool,
    items: &[Value<'_>],
) -> EncodeResult<()> {
    let fd = field.descriptor;

    if packed && !items.is_empty() {
        put_tag(buf, fd.number, WireType::LengthDelimited);
        let marker = LengthMarker::reserve(buf);
        for item in items {
            marshal_singular(buf, field, fd.kind, item)?;
        }
        marker.finish(buf);
        return Ok(());
    }

    let wt = tag_type(field, fd.kind)?;
    for item in items {
        put_tag(buf, fd.number, wt);
        marshal_singular(buf, field, fd.kind, item)?;
    }
    Ok(())
}

/// Each entry is a little message: key as field 1, value as field 2. Both
/// are always written, defaults included.
fn marshal_map(
    buf: &mut Vec<u8>,
    field: &FieldRef<'_>,
    key_kind: Kind,
    value_kind: Kind,
    entries: &[(MapKey<'_>, Value<'_>)],
) -> EncodeResult<()> {
    if !key_kind.is_valid_map_key() {
        return Err(EncodeError::InvalidKind {
            field: field.full_name(),
            kind: key_kind,
        });
    }
    let key_wt = tag_type(field, key_kind)?;
    let value_wt = tag_type(field, value_kind)?;

    let mut sorted: Vec<&(MapKey<'_>, Value<'_>)> = entries.iter().collect();
    sorted.sort_by(|(a, _), (b, _)| a.canonical_cmp(b));

    for (key, value) in sorted {
        put_tag(buf, field.descriptor.number, WireType::LengthDelimited);
        let marker = LengthMarker::reserve(buf);

        put_tag(buf, 1, key_wt);
        marshal_singular(buf, field, key_kind, &key.to_value())?;
        put_tag(buf, 2, value_wt);
        marshal_singular(buf, field, value_kind, value)?;

        marker.finish(buf);
    }
    Ok(())
}

fn marshal_singular(
    buf: &mut Vec<u8>,
    field: &FieldRef<'_>,
    kind: Kind,
    value: &Value<'_>,
) -> EncodeResult<()> {
    match (kind, value) {
        (Kind::Bool, Value::Bool(v)) => put_varint(buf, u64::from(*v)),
        (Kind::Enum, Value::Enum(v)) => put_varint(buf, i64::from(*v) as u64),
        (Kind::Int32, Value::I32(v)) => put_varint(buf, i64::from(*v) as u64),
        (Kind::Sint32, Value::I32(v)) => put_varint(buf, zigzag(i64::from(*v))),
        (Kind::Uint32, Value::U32(v)) => put_varint(buf, u64::from(*v)),
        (Kind::Int64, Value::I64(v)) => put_varint(buf, *v as u64),
        (Kind::Sint64, Value::I64(v)) => put_varint(buf, zigzag(*v)),
        (Kind::Uint64, Value::U64(v)) => put_varint(buf, *v),
        (Kind::Sfixed32, Value::I32(v)) => put_fixed32(buf, *v as u32),
        (Kind::Fixed32, Value::U32(v)) => put_fixed32(buf, *v),
        (Kind::Float, Value::F32(v)) => put_fixed32(buf, v.to_bits()),
        (Kind::Sfixed64, Value::I64(v)) => put_fixed64(buf, *v as u64),
        (Kind::Fixed64, Value::U64(v)) => put_fixed64(buf, *v),
        (Kind::Double, Value::F64(v)) => put_fixed64(buf, v.to_bits()),
        (Kind::String, Value::String(v)) => {
            if std::str::from_utf8(v).is_err() {
                return Err(EncodeError::InvalidUtf8 {
                    field: field.full_name(),
                });
            }
            put_bytes(buf, v);
        }
        (Kind::Bytes, Value::Bytes(v)) => put_bytes(buf, v),
        (Kind::Message, Value::Message(m)) => {
            let marker = LengthMarker::reserve(buf);
            marshal_into(buf, *m)?;
            marker.finish(buf);
        }
        (Kind::Group, _) => {
            return Err(EncodeError::InvalidKind {
                field: field.full_name(),
                kind,
            })
        }
        _ => return Err(field.mismatch(kind)),
    }
    Ok(())
}
