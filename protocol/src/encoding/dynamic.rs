//! Owned, schema-less messages.
//!
//! A [`DynamicMessage`] carries its own field descriptors, so it can stand
//! in for any message shape without generated code: maps, oneofs,
//! extensions, proto2 leftovers, unknown-field payloads. It's what the
//! encoder tests are built on, and it's handy for poking at the encoder
//! from tools.

use super::reflect::{FieldDescriptor, MapKey, ProtoMessage, Syntax, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    Bool(bool),
    Enum(i32),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    /// Raw bytes, not `String`: invalid UTF-8 must be representable so the
    /// encoder can reject it.
    String(Vec<u8>),
    Bytes(Vec<u8>),
    Message(DynamicMessage),
    List(Vec<DynamicValue>),
    Map(Vec<(DynamicKey, DynamicValue)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DynamicKey {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    String(String),
}

impl DynamicKey {
    fn as_key(&self) -> MapKey<'_> {
        match self {
            DynamicKey::Bool(v) => MapKey::Bool(*v),
            DynamicKey::I32(v) => MapKey::I32(*v),
            DynamicKey::I64(v) => MapKey::I64(*v),
            DynamicKey::U32(v) => MapKey::U32(*v),
            DynamicKey::U64(v) => MapKey::U64(*v),
            DynamicKey::String(v) => MapKey::String(v.as_bytes()),
        }
    }
}

impl DynamicValue {
    fn as_value(&self) -> Value<'_> {
        match self {
            DynamicValue::Bool(v) => Value::Bool(*v),
            DynamicValue::Enum(v) => Value::Enum(*v),
            DynamicValue::I32(v) => Value::I32(*v),
            DynamicValue::I64(v) => Value::I64(*v),
            DynamicValue::U32(v) => Value::U32(*v),
            DynamicValue::U64(v) => Value::U64(*v),
            DynamicValue::F32(v) => Value::F32(*v),
            DynamicValue::F64(v) => Value::F64(*v),
            DynamicValue::String(v) => Value::String(v),
            DynamicValue::Bytes(v) => Value::Bytes(v),
            DynamicValue::Message(m) => Value::Message(m),
            DynamicValue::List(items) => Value::List(items.iter().map(Self::as_value).collect()),
            DynamicValue::Map(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.as_key(), v.as_value()))
                    .collect(),
            ),
        }
    }
}

/// A message whose shape is described at runtime.
///
/// Fields set with [`with`](Self::with) are always considered populated;
/// presence rules are the caller's business here.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicMessage {
    full_name: String,
    syntax: Syntax,
    message_set: bool,
    fields: Vec<(FieldDescriptor, DynamicValue)>,
    unknown: Vec<u8>,
}

impl DynamicMessage {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            syntax: Syntax::Proto3,
            message_set: false,
            fields: Vec::new(),
            unknown: Vec::new(),
        }
    }

    pub fn proto2(mut self) -> Self {
        self.syntax = Syntax::Proto2;
        self
    }

    pub fn message_set(mut self) -> Self {
        self.message_set = true;
        self
    }

    pub fn with_unknown(mut self, raw: Vec<u8>) -> Self {
        self.unknown = raw;
        self
    }

    /// Sets a field, replacing any earlier value with the same number.
    pub fn with(mut self, descriptor: FieldDescriptor, value: DynamicValue) -> Self {
        self.fields.retain(|(fd, _)| fd.number != descriptor.number);
        self.fields.push((descriptor, value));
        self
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

impl ProtoMessage for DynamicMessage {
    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn syntax(&self) -> Syntax {
        self.syntax
    }

    fn is_message_set(&self) -> bool {
        self.message_set
    }

    fn fields(&self) -> Vec<(FieldDescriptor, Value<'_>)> {
        self.fields
            .iter()
            .map(|(fd, v)| (fd.clone(), v.as_value()))
            .collect()
    }

    fn unknown_fields(&self) -> &[u8] {
        &self.unknown
    }
}
