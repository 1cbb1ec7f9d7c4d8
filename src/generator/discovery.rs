use std::collections::HashMap;

use tracing::debug;

use super::error::GenerationError;
use super::wire_type::WellKnownTypes;
use crate::descriptor::{RecordDescriptor, TypeDescriptor};
use crate::handler::HandlerDescriptor;

/// Insertion-ordered set of records keyed by declared name.
///
/// Order is discovery order and drives message emission order.
#[derive(Debug, Default, Clone)]
pub struct RecordSet {
    records: Vec<RecordDescriptor>,
    index: HashMap<String, usize>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `record` unless a record with the same name is already present.
    ///
    /// Returns `Ok(true)` when added and `Ok(false)` when an identical record
    /// was already known. A different record under the same name is a
    /// [`GenerationError::NameCollision`].
    pub fn insert(&mut self, record: &RecordDescriptor) -> Result<bool, GenerationError> {
        if let Some(&position) = self.index.get(&record.name) {
            if self.records[position] != *record {
                return Err(GenerationError::NameCollision {
                    name: record.name.clone(),
                });
            }
            return Ok(false);
        }
        self.index.insert(record.name.clone(), self.records.len());
        self.records.push(record.clone());
        Ok(true)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordDescriptor> {
        self.records.iter()
    }

    pub fn into_vec(self) -> Vec<RecordDescriptor> {
        self.records
    }
}

/// Records reachable from `root`'s fields, in depth-first pre-order.
///
/// `root` itself is not included.
pub fn discover(
    root: &RecordDescriptor,
    well_known: &WellKnownTypes,
) -> Result<Vec<RecordDescriptor>, GenerationError> {
    let mut found = RecordSet::new();
    discover_into(root, &mut found, well_known)?;
    Ok(found.into_vec())
}

/// Walk `root`'s fields left to right, adding every nested record to `found`.
///
/// A record is added before its own fields are walked. Records already in
/// `found` or listed in `well_known` are skipped without descending into
/// them, which also terminates on cyclic shapes.
pub fn discover_into(
    root: &RecordDescriptor,
    found: &mut RecordSet,
    well_known: &WellKnownTypes,
) -> Result<(), GenerationError> {
    for field in &root.fields {
        let Some(record) = nested_record(&field.ty) else {
            continue;
        };
        if well_known.is_ignored(&record.name) {
            continue;
        }
        if !found.insert(record)? {
            continue;
        }
        debug!(
            record = %record.name,
            parent = %root.name,
            field = %field.name,
            "Discovered record"
        );
        discover_into(record, found, well_known)?;
    }
    Ok(())
}

/// The record a field type is or ultimately wraps, through sequence elements
/// and map values.
fn nested_record(ty: &TypeDescriptor) -> Option<&RecordDescriptor> {
    match ty {
        TypeDescriptor::Record(record) => Some(record),
        TypeDescriptor::Sequence(element) => nested_record(element),
        TypeDescriptor::Map(_, value) => nested_record(value),
        TypeDescriptor::Scalar(_) => None,
    }
}

/// Every record needed to describe `handlers`, deduplicated.
///
/// Handlers are visited in registration order. For each one the request is
/// walked, then the response, then the request and response records
/// themselves are appended (a no-op when already discovered).
pub fn collect_records(
    handlers: &[HandlerDescriptor],
    well_known: &WellKnownTypes,
) -> Result<Vec<RecordDescriptor>, GenerationError> {
    let mut records = RecordSet::new();
    for handler in handlers {
        discover_into(&handler.request, &mut records, well_known)?;
        discover_into(&handler.response, &mut records, well_known)?;
        records.insert(&handler.request)?;
        records.insert(&handler.response)?;
    }
    debug!(
        handlers = handlers.len(),
        records = records.len(),
        "Collected handler records"
    );
    Ok(records.into_vec())
}
