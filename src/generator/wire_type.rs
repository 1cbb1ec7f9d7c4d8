use crate::descriptor::{ScalarKind, TypeDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Wire type of the well-known timestamp message.
pub const TIMESTAMP_WIRE_TYPE: &str = "google.protobuf.Timestamp";
/// Wire type of the well-known duration message.
pub const DURATION_WIRE_TYPE: &str = "google.protobuf.Duration";

const TIMESTAMP_IMPORT: &str = "google/protobuf/timestamp.proto";
const DURATION_IMPORT: &str = "google/protobuf/duration.proto";

/// A type with a built-in wire representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellKnownType {
    /// Fully qualified wire type, e.g. `google.protobuf.Timestamp`
    pub wire_type: String,
    /// Schema file that defines the wire type, if one must be imported
    #[serde(default)]
    pub import: Option<String>,
}

impl WellKnownType {
    pub fn new(wire_type: impl Into<String>, import: Option<&str>) -> Self {
        Self {
            wire_type: wire_type.into(),
            import: import.map(str::to_string),
        }
    }
}

/// Record names that never produce a message block.
///
/// Every entry is skipped by discovery and rendered as its wire type wherever
/// it is referenced. Defaults to `Time` and `Duration`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellKnownTypes {
    types: BTreeMap<String, WellKnownType>,
}

impl Default for WellKnownTypes {
    fn default() -> Self {
        let mut types = BTreeMap::new();
        types.insert(
            "Time".to_string(),
            WellKnownType::new(TIMESTAMP_WIRE_TYPE, Some(TIMESTAMP_IMPORT)),
        );
        types.insert(
            "Duration".to_string(),
            WellKnownType::new(DURATION_WIRE_TYPE, Some(DURATION_IMPORT)),
        );
        Self { types }
    }
}

impl WellKnownTypes {
    /// An empty table: nothing is ignored.
    pub fn empty() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, name: impl Into<String>, ty: WellKnownType) {
        self.types.insert(name.into(), ty);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = (String, WellKnownType)>) {
        self.types.extend(entries);
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&WellKnownType> {
        self.types.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

/// Maps type descriptors to proto3 wire types.
///
/// Pure and total: unknown scalars fall back to their bare name, and the
/// mapper never triggers discovery.
#[derive(Debug, Clone, Copy)]
pub struct WireTypeMapper<'a> {
    well_known: &'a WellKnownTypes,
}

impl<'a> WireTypeMapper<'a> {
    pub fn new(well_known: &'a WellKnownTypes) -> Self {
        Self { well_known }
    }

    /// Wire type expression for `ty`.
    ///
    /// Rules, in priority order: sequences become `repeated`, maps become
    /// `map<K, V>`, scalars use the fixed table, and records use their bare
    /// name unless the name is a well-known type.
    pub fn map(&self, ty: &TypeDescriptor) -> String {
        match ty {
            TypeDescriptor::Sequence(element) => format!("repeated {}", self.map(element)),
            TypeDescriptor::Map(key, value) => {
                format!("map<{}, {}>", self.map(key), self.map(value))
            }
            TypeDescriptor::Scalar(kind) => scalar_wire_type(kind).to_string(),
            TypeDescriptor::Record(record) => match self.well_known.get(&record.name) {
                Some(known) => known.wire_type.clone(),
                None => record.name.clone(),
            },
        }
    }

    /// Schema imports needed to reference `ty`, added to `imports`.
    pub fn collect_imports(&self, ty: &TypeDescriptor, imports: &mut BTreeSet<String>) {
        match ty {
            TypeDescriptor::Sequence(element) => self.collect_imports(element, imports),
            TypeDescriptor::Map(key, value) => {
                self.collect_imports(key, imports);
                self.collect_imports(value, imports);
            }
            TypeDescriptor::Scalar(ScalarKind::Timestamp) => {
                imports.insert(TIMESTAMP_IMPORT.to_string());
            }
            TypeDescriptor::Scalar(ScalarKind::Duration) => {
                imports.insert(DURATION_IMPORT.to_string());
            }
            TypeDescriptor::Scalar(_) => {}
            TypeDescriptor::Record(record) => {
                if let Some(import) = self
                    .well_known
                    .get(&record.name)
                    .and_then(|known| known.import.as_ref())
                {
                    imports.insert(import.clone());
                }
            }
        }
    }
}

fn scalar_wire_type(kind: &ScalarKind) -> &str {
    match kind {
        ScalarKind::Int8 | ScalarKind::Int16 | ScalarKind::Int32 => "int32",
        ScalarKind::Int64 => "int64",
        ScalarKind::Uint8 | ScalarKind::Uint16 | ScalarKind::Uint32 => "uint32",
        ScalarKind::Uint64 => "uint64",
        ScalarKind::Float32 => "float",
        ScalarKind::Float64 => "double",
        ScalarKind::Bool => "bool",
        ScalarKind::Text => "string",
        ScalarKind::Timestamp => TIMESTAMP_WIRE_TYPE,
        ScalarKind::Duration => DURATION_WIRE_TYPE,
        ScalarKind::Other(name) => name,
    }
}
