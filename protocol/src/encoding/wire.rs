//! Low-level wire helpers.
//!
//! Varints, tags and zigzag come straight from `prost::encoding`, so the
//! bytes we produce are exactly what any protobuf decoder expects. What
//! prost doesn't give us is the speculative length prefix, which lives in
//! [`LengthMarker`].

use prost::encoding::{encode_key, encode_varint, encoded_len_varint, WireType};

use super::reflect::Kind;

/// Bytes reserved up front for a length prefix. One byte covers any
/// payload under 128 bytes, which is most of them.
pub const SPECULATIVE_LENGTH: usize = 1;

/// Wire type used for a value of the given kind, or `None` for kinds that
/// have no encoding here (groups).
pub fn wire_type(kind: Kind) -> Option<WireType> {
    match kind {
        Kind::Bool
        | Kind::Enum
        | Kind::Int32
        | Kind::Sint32
        | Kind::Uint32
        | Kind::Int64
        | Kind::Sint64
        | Kind::Uint64 => Some(WireType::Varint),
        Kind::Sfixed32 | Kind::Fixed32 | Kind::Float => Some(WireType::ThirtyTwoBit),
        Kind::Sfixed64 | Kind::Fixed64 | Kind::Double => Some(WireType::SixtyFourBit),
        Kind::String | Kind::Bytes | Kind::Message => Some(WireType::LengthDelimited),
        Kind::Group => None,
    }
}

pub fn put_tag(buf: &mut Vec<u8>, number: u32, wire_type: WireType) {
    encode_key(number, wire_type, buf);
}

pub fn put_varint(buf: &mut Vec<u8>, value: u64) {
    encode_varint(value, buf);
}

pub fn put_fixed32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn put_fixed64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Length-prefixed bytes.
pub fn put_bytes(buf: &mut Vec<u8>, value: &[u8]) {
    encode_varint(value.len() as u64, buf);
    buf.extend_from_slice(value);
}

/// Tag, length, payload. The framing every repeated message element gets.
pub fn put_length_delimited(buf: &mut Vec<u8>, number: u32, value: &[u8]) {
    put_tag(buf, number, WireType::LengthDelimited);
    put_bytes(buf, value);
}

/// 64-bit zigzag. Sign-extended 32-bit inputs come out the same as a
/// 32-bit zigzag would produce.
pub fn zigzag(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

// ---------------------------------------------------------------------------
// LengthMarker
// ---------------------------------------------------------------------------

/// A reserved slot for a length prefix whose value isn't known yet.
///
/// `reserve` pushes a one-byte placeholder and remembers where it is. Once
/// the payload has been written, `finish` computes the payload length and
/// writes it into the slot. If the varint needs more than one byte, the
/// buffer grows and the payload is shifted right to make room.
#[derive(Debug)]
#[must_use = "a reserved length must be finished or the output is corrupt"]
pub struct LengthMarker {
    pos: usize,
}

impl LengthMarker {
    pub fn reserve(buf: &mut Vec<u8>) -> Self {
        let pos = buf.len();
        buf.resize(pos + SPECULATIVE_LENGTH, 0);
        Self { pos }
    }

    pub fn finish(self, buf: &mut Vec<u8>) {
        let start = self.pos + SPECULATIVE_LENGTH;
        let len = buf.len() - start;
        let size = encoded_len_varint(len as u64);

        if size != SPECULATIVE_LENGTH {
            buf.resize(buf.len() + size - SPECULATIVE_LENGTH, 0);
            buf.copy_within(start..start + len, self.pos + size);
        }

        let mut prefix = Vec::with_capacity(size);
        encode_varint(len as u64, &mut prefix);
        buf[self.pos..self.pos + size].copy_from_slice(&prefix);
    }
}
