//! Writer contract and the record buffer shared by format writers.

use crate::error::Result;
use crate::model::Record;
use std::collections::HashMap;

/// Trait for SBOM format writers.
///
/// A writer is built around exactly one parsed document and turns it into an
/// ordered list of records in a single call. It reads the document but never
/// changes it, and it either returns every record or fails with the error
/// that stopped it; there is no partial result.
pub trait SbomWriter {
    /// Name of the format this writer handles.
    fn format_name(&self) -> &'static str;

    /// Write the document into records, consuming the writer.
    fn write_document(self) -> Result<Vec<Record>>
    where
        Self: Sized;
}

/// Ordered record accumulator with identity lookup.
///
/// Pushing a record whose identity is already present folds it into the
/// earlier record (see [`Record::absorb`]) so every identity appears once.
/// Records with an unresolved identity are kept as-is.
#[derive(Debug, Default)]
pub struct RecordBuffer {
    records: Vec<Record>,
    positions: HashMap<String, usize>,
}

impl RecordBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, merging it into an existing one with the same identity.
    pub fn push(&mut self, record: Record) {
        let Some(identity) = record.identity.clone() else {
            self.records.push(record);
            return;
        };

        match self.positions.get(&identity) {
            Some(&index) => self.records[index].absorb(record),
            None => {
                self.positions.insert(identity, self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Append every record of an iterator.
    pub fn extend(&mut self, records: impl IntoIterator<Item = Record>) {
        for record in records {
            self.push(record);
        }
    }

    /// Whether a record with this identity has been written.
    #[must_use]
    pub fn contains(&self, identity: &str) -> bool {
        self.positions.contains_key(identity)
    }

    #[must_use]
    pub fn get(&self, identity: &str) -> Option<&Record> {
        self.positions.get(identity).map(|&index| &self.records[index])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}
