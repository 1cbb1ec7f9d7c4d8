//! # Descriptor Module
//!
//! Language-neutral description of the data types carried by handlers.
//!
//! ## Overview
//!
//! Every request and response type is described as a [`TypeDescriptor`] tree
//! built once, statically, through the [`Describe`] trait (usually via
//! `#[derive(Describe)]`). The generator never inspects Rust types at runtime;
//! it walks these plain-data trees instead.
//!
//! ```text
//! TypeDescriptor
//! ├── Scalar(ScalarKind)          i32, String, SystemTime, ...
//! ├── Record(RecordDescriptor)    named fields, ordinal = declaration order
//! ├── Sequence(element)           Vec<T>, [T; N], sets
//! └── Map(key, value)             HashMap<K, V>, BTreeMap<K, V>
//! ```
//!
//! ## Identity
//!
//! Records are identified by their declared name, not by their shape. Two
//! records sharing a name are only accepted by the generator when their
//! descriptors are identical; see
//! [`RecordSet`](crate::generator::RecordSet).
//!
//! ## Example
//!
//! ```rust
//! use protoroot::{Describe, TypeDescriptor};
//!
//! #[derive(Describe)]
//! struct Widget {
//!     id: i32,
//!     tags: Vec<String>,
//! }
//!
//! let TypeDescriptor::Record(record) = Widget::describe() else { unreachable!() };
//! assert_eq!(record.name, "Widget");
//! assert_eq!(record.fields[1].ordinal, 2);
//! ```

mod describe;

pub use describe::Describe;
pub use protoroot_macros::Describe;

use serde::Serialize;
use std::fmt;

/// Primitive data kinds understood by the wire-type mapper.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Bool,
    Text,
    /// A point in time; maps to the well-known timestamp type.
    Timestamp,
    /// A span of time; maps to the well-known duration type.
    Duration,
    /// Any scalar without a wire mapping. Rendered by its bare name.
    Other(String),
}

impl ScalarKind {
    /// Declared name of the scalar as it appears in Rust source.
    pub fn name(&self) -> &str {
        match self {
            ScalarKind::Int8 => "i8",
            ScalarKind::Int16 => "i16",
            ScalarKind::Int32 => "i32",
            ScalarKind::Int64 => "i64",
            ScalarKind::Uint8 => "u8",
            ScalarKind::Uint16 => "u16",
            ScalarKind::Uint32 => "u32",
            ScalarKind::Uint64 => "u64",
            ScalarKind::Float32 => "f32",
            ScalarKind::Float64 => "f64",
            ScalarKind::Bool => "bool",
            ScalarKind::Text => "String",
            ScalarKind::Timestamp => "SystemTime",
            ScalarKind::Duration => "Duration",
            ScalarKind::Other(name) => name,
        }
    }
}

/// Description of a single data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDescriptor {
    Scalar(ScalarKind),
    Record(RecordDescriptor),
    Sequence(Box<TypeDescriptor>),
    Map(Box<TypeDescriptor>, Box<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn sequence(element: TypeDescriptor) -> Self {
        TypeDescriptor::Sequence(Box::new(element))
    }

    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        TypeDescriptor::Map(Box::new(key), Box::new(value))
    }

    /// Declared type name.
    ///
    /// Composites report the name of their element (sequences) or value
    /// (maps), mirroring how the generated schema refers to them.
    pub fn name(&self) -> &str {
        match self {
            TypeDescriptor::Scalar(kind) => kind.name(),
            TypeDescriptor::Record(record) => &record.name,
            TypeDescriptor::Sequence(element) => element.name(),
            TypeDescriptor::Map(_, value) => value.name(),
        }
    }

    pub fn as_record(&self) -> Option<&RecordDescriptor> {
        match self {
            TypeDescriptor::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_record(self) -> Result<RecordDescriptor, TypeDescriptor> {
        match self {
            TypeDescriptor::Record(record) => Ok(record),
            other => Err(other),
        }
    }

    /// Short label for the descriptor kind, used in error messages.
    pub fn kind_label(&self) -> &'static str {
        match self {
            TypeDescriptor::Scalar(_) => "scalar",
            TypeDescriptor::Record(_) => "record",
            TypeDescriptor::Sequence(_) => "sequence",
            TypeDescriptor::Map(_, _) => "map",
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Scalar(kind) => write!(f, "{}", kind.name()),
            TypeDescriptor::Record(record) => write!(f, "{}", record.name),
            TypeDescriptor::Sequence(element) => write!(f, "Vec<{element}>"),
            TypeDescriptor::Map(key, value) => write!(f, "Map<{key}, {value}>"),
        }
    }
}

/// A named record with fields in declaration order.
///
/// Ordinals are assigned by [`RecordDescriptor::field`] and are always
/// contiguous from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field, assigning it the next ordinal.
    pub fn field(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        let ordinal = self.fields.len() as u32 + 1;
        self.fields.push(FieldDescriptor {
            name: name.into(),
            ordinal,
            ty,
        });
        self
    }
}

/// A field of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    /// 1-based declaration position; the wire field number.
    pub ordinal: u32,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}
