//! Fast-fail checks without a full marshal.
//!
//! `validate_message` walks a message tree and reports the same refusals
//! the encoder would (unknown fields, proto2, message sets, groups) without producing any
//! bytes. Useful before persisting something that was encoded elsewhere.

use super::error::{EncodeError, EncodeResult};
use super::reflect::{Kind, ProtoMessage, Syntax, Value};

pub fn validate_message(message: &dyn ProtoMessage) -> EncodeResult<()> {
    let unknown = message.unknown_fields();
    if !unknown.is_empty() {
        return Err(EncodeError::UnknownFields { len: unknown.len() });
    }
    if message.syntax() == Syntax::Proto2 {
        return Err(EncodeError::UnsupportedSyntax);
    }
    if message.is_message_set() {
        return Err(EncodeError::MessageSet);
    }

    for (fd, value) in message.fields() {
        if fd.kind == Kind::Group {
            return Err(EncodeError::GroupsUnsupported);
        }
        validate_value(&value)?;
    }
    Ok(())
}

fn validate_value(value: &Value<'_>) -> EncodeResult<()> {
    match value {
        Value::Message(m) => validate_message(*m),
        Value::List(items) => items.iter().try_for_each(validate_value),
        Value::Map(entries) => entries.iter().try_for_each(|(_, v)| validate_value(v)),
        _ => Ok(()),
    }
}
