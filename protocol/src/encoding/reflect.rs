//! # Message Reflection
//!
//! The canonical encoder never looks at concrete Rust structs. It walks a
//! message through the [`ProtoMessage`] trait: a message reports its name,
//! its dialect, and the list of fields that are actually populated, each
//! paired with a [`FieldDescriptor`] and a borrowed [`Value`].
//!
//! That indirection is what keeps the encoding independent of whatever
//! code generator produced the struct. Generated types (see
//! `transaction::pb`) implement the trait by hand with a [`FieldSet`];
//! schema-less messages use [`DynamicMessage`](super::DynamicMessage).
//!
//! Presence follows proto3: a singular scalar equal to its default value is
//! not populated, an empty list or map is not populated, and a singular
//! message field is populated whenever it is set (even if it is empty).

use std::cmp::Ordering;

/// Wire dialect of a message. Only proto3 can be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Syntax {
    Proto2,
    #[default]
    Proto3,
}

/// The declared kind of a field's elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Enum,
    Int32,
    Sint32,
    Uint32,
    Int64,
    Sint64,
    Uint64,
    Sfixed32,
    Fixed32,
    Float,
    Sfixed64,
    Fixed64,
    Double,
    String,
    Bytes,
    Message,
    Group,
}

impl Kind {
    /// Scalar numeric kinds can be packed; length-delimited ones can't.
    pub fn is_packable(self) -> bool {
        !matches!(
            self,
            Kind::String | Kind::Bytes | Kind::Message | Kind::Group
        )
    }

    /// Whether this kind is allowed as a map key.
    pub fn is_valid_map_key(self) -> bool {
        matches!(
            self,
            Kind::Bool
                | Kind::Int32
                | Kind::Sint32
                | Kind::Sfixed32
                | Kind::Int64
                | Kind::Sint64
                | Kind::Sfixed64
                | Kind::Uint32
                | Kind::Fixed32
                | Kind::Uint64
                | Kind::Fixed64
                | Kind::String
        )
    }
}

/// How many values a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Singular,
    Repeated { packed: bool },
    Map { key: Kind, value: Kind },
}

/// Membership of a field in a `oneof` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Oneof {
    /// Declaration index of the oneof within its message.
    pub index: usize,
    /// Synthetic oneofs wrap proto3 `optional` fields and sort like plain
    /// fields.
    pub synthetic: bool,
}

/// Static description of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub number: u32,
    pub kind: Kind,
    pub cardinality: Cardinality,
    pub oneof: Option<Oneof>,
    pub extension: bool,
}

impl FieldDescriptor {
    pub fn singular(number: u32, name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            number,
            kind,
            cardinality: Cardinality::Singular,
            oneof: None,
            extension: false,
        }
    }

    /// A repeated field. Proto3 packs numeric scalars by default, so this
    /// does too.
    pub fn repeated(number: u32, name: &'static str, kind: Kind) -> Self {
        Self {
            cardinality: Cardinality::Repeated {
                packed: kind.is_packable(),
            },
            ..Self::singular(number, name, kind)
        }
    }

    /// A repeated numeric field explicitly marked `[packed = false]`.
    pub fn unpacked(number: u32, name: &'static str, kind: Kind) -> Self {
        Self {
            cardinality: Cardinality::Repeated { packed: false },
            ..Self::singular(number, name, kind)
        }
    }

    /// A map field. On the wire a map is a repeated entry message, hence
    /// `Kind::Message` for the field itself.
    pub fn map(number: u32, name: &'static str, key: Kind, value: Kind) -> Self {
        Self {
            cardinality: Cardinality::Map { key, value },
            ..Self::singular(number, name, Kind::Message)
        }
    }

    pub fn in_oneof(mut self, index: usize) -> Self {
        self.oneof = Some(Oneof {
            index,
            synthetic: false,
        });
        self
    }

    /// Marks the field as a proto3 `optional`, which is modelled as a
    /// synthetic oneof.
    pub fn optional(mut self, index: usize) -> Self {
        self.oneof = Some(Oneof {
            index,
            synthetic: true,
        });
        self
    }

    pub fn as_extension(mut self) -> Self {
        self.extension = true;
        self
    }

    pub fn is_list(&self) -> bool {
        matches!(self.cardinality, Cardinality::Repeated { .. })
    }

    pub fn is_map(&self) -> bool {
        matches!(self.cardinality, Cardinality::Map { .. })
    }

    /// Position of this field in canonical output relative to `other`.
    ///
    /// Extensions come first. Two fields of the same oneof sort by number,
    /// fields of different oneofs sort by oneof declaration index. A field
    /// in a real (non-synthetic) oneof sorts after every plain field.
    /// Everything else sorts by field number.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        if self.canonical_less(other) {
            Ordering::Less
        } else if other.canonical_less(self) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    fn canonical_less(&self, other: &Self) -> bool {
        match (self.oneof, other.oneof) {
            _ if self.extension != other.extension => self.extension,
            (Some(a), Some(b)) if a.index == b.index => self.number < other.number,
            (Some(a), Some(b)) => a.index < b.index,
            (Some(a), None) if !a.synthetic => false,
            (None, Some(b)) if !b.synthetic => true,
            _ => self.number < other.number,
        }
    }
}

/// A borrowed field value.
///
/// Strings are carried as raw bytes. Rust's `str` already guarantees UTF-8,
/// but dynamic messages and decoded payloads may not, and the encoder is
/// the one place that must refuse invalid text.
#[derive(Clone)]
pub enum Value<'a> {
    Bool(bool),
    Enum(i32),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(&'a [u8]),
    Bytes(&'a [u8]),
    Message(&'a dyn ProtoMessage),
    List(Vec<Value<'a>>),
    Map(Vec<(MapKey<'a>, Value<'a>)>),
}

impl std::fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "Bool({v})"),
            Value::Enum(v) => write!(f, "Enum({v})"),
            Value::I32(v) => write!(f, "I32({v})"),
            Value::I64(v) => write!(f, "I64({v})"),
            Value::U32(v) => write!(f, "U32({v})"),
            Value::U64(v) => write!(f, "U64({v})"),
            Value::F32(v) => write!(f, "F32({v})"),
            Value::F64(v) => write!(f, "F64({v})"),
            Value::String(v) => write!(f, "String({:?})", String::from_utf8_lossy(v)),
            Value::Bytes(v) => write!(f, "Bytes({})", hex::encode(v)),
            Value::Message(m) => write!(f, "Message({})", m.full_name()),
            Value::List(v) => f.debug_list().entries(v).finish(),
            Value::Map(v) => f.debug_map().entries(v.iter().map(|(k, v)| (k, v))).finish(),
        }
    }
}

/// A borrowed map key. Only the kinds proto allows as keys are here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapKey<'a> {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    String(&'a [u8]),
}

impl<'a> MapKey<'a> {
    /// Canonical key order: `false` before `true`, integers numerically,
    /// strings bytewise.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (MapKey::Bool(a), MapKey::Bool(b)) => a.cmp(b),
            (MapKey::I32(a), MapKey::I32(b)) => a.cmp(b),
            (MapKey::I64(a), MapKey::I64(b)) => a.cmp(b),
            (MapKey::U32(a), MapKey::U32(b)) => a.cmp(b),
            (MapKey::U64(a), MapKey::U64(b)) => a.cmp(b),
            (MapKey::String(a), MapKey::String(b)) => a.cmp(b),
            // Keys of one map share a kind; mixed variants have no order.
            _ => Ordering::Equal,
        }
    }

    pub fn to_value(self) -> Value<'a> {
        match self {
            MapKey::Bool(v) => Value::Bool(v),
            MapKey::I32(v) => Value::I32(v),
            MapKey::I64(v) => Value::I64(v),
            MapKey::U32(v) => Value::U32(v),
            MapKey::U64(v) => Value::U64(v),
            MapKey::String(v) => Value::String(v),
        }
    }
}

/// Reflection surface every encodable message provides.
pub trait ProtoMessage {
    /// Fully qualified message name, e.g. `strata.tx.v1.Transaction`.
    fn full_name(&self) -> &str;

    fn syntax(&self) -> Syntax {
        Syntax::Proto3
    }

    fn is_message_set(&self) -> bool {
        false
    }

    /// Populated fields, in any order.
    fn fields(&self) -> Vec<(FieldDescriptor, Value<'_>)>;

    /// Raw bytes of fields this message did not recognise when decoded.
    fn unknown_fields(&self) -> &[u8] {
        &[]
    }
}

// ---------------------------------------------------------------------------
// FieldSet
// ---------------------------------------------------------------------------

/// Builder for [`ProtoMessage::fields`] that applies proto3 presence rules,
/// so impls for generated types stay one line per field.
#[derive(Default)]
pub struct FieldSet<'a> {
    fields: Vec<(FieldDescriptor, Value<'a>)>,
}

impl<'a> FieldSet<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(mut self, number: u32, name: &'static str, value: &'a [u8]) -> Self {
        if !value.is_empty() {
            self.fields.push((
                FieldDescriptor::singular(number, name, Kind::Bytes),
                Value::Bytes(value),
            ));
        }
        self
    }

    pub fn string(mut self, number: u32, name: &'static str, value: &'a str) -> Self {
        if !value.is_empty() {
            self.fields.push((
                FieldDescriptor::singular(number, name, Kind::String),
                Value::String(value.as_bytes()),
            ));
        }
        self
    }

    pub fn bool(mut self, number: u32, name: &'static str, value: bool) -> Self {
        if value {
            self.fields.push((
                FieldDescriptor::singular(number, name, Kind::Bool),
                Value::Bool(value),
            ));
        }
        self
    }

    pub fn uint64(mut self, number: u32, name: &'static str, value: u64) -> Self {
        if value != 0 {
            self.fields.push((
                FieldDescriptor::singular(number, name, Kind::Uint64),
                Value::U64(value),
            ));
        }
        self
    }

    pub fn message<M: ProtoMessage>(
        mut self,
        number: u32,
        name: &'static str,
        value: Option<&'a M>,
    ) -> Self {
        if let Some(m) = value {
            self.fields.push((
                FieldDescriptor::singular(number, name, Kind::Message),
                Value::Message(m),
            ));
        }
        self
    }

    pub fn messages<M: ProtoMessage>(
        mut self,
        number: u32,
        name: &'static str,
        values: &'a [M],
    ) -> Self {
        if !values.is_empty() {
            let list = values
                .iter()
                .map(|m| Value::Message(m as &dyn ProtoMessage))
                .collect();
            self.fields.push((
                FieldDescriptor::repeated(number, name, Kind::Message),
                Value::List(list),
            ));
        }
        self
    }

    pub fn finish(self) -> Vec<(FieldDescriptor, Value<'a>)> {
        self.fields
    }
}
