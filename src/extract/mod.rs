//! Record extraction: documents in, cleaned records out.
//!
//! [`Extractor::records`] returns a lazy [`RecordStream`]. Each call to
//! `next` either hands out a buffered record of the current document or pulls
//! the next document from the source, detects its format and writes it.
//! Only one document's records are held in memory at a time.
//!
//! ```
//! use sbom_graph::extract::{ExtractOptions, Extractor, MemorySource};
//! use serde_json::json;
//!
//! let source = MemorySource::new().with_document(
//!     "inline",
//!     json!({
//!         "bomFormat": "CycloneDX",
//!         "serialNumber": "urn:uuid:1",
//!         "components": [{"type": "library", "name": "foo", "supplier": {"name": "acme"}}]
//!     }),
//! );
//!
//! let records: Vec<_> = Extractor::new(source, ExtractOptions::default())
//!     .records()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(records.len(), 2);
//! assert!(records[1].attribute("supplier.name").is_some());
//! ```

mod cleanup;
mod source;

pub use cleanup::{
    clean_attributes, prune_attributes, CleanupError, DEFAULT_DELIMITER, INTERNAL_KEY_PREFIX,
};
pub use source::{ChainSource, DocumentSource, FileSource, MemorySource, SourceDocument};
#[cfg(feature = "github")]
pub use source::{GithubSource, GithubSourceConfig};

use crate::config::{ErrorPolicy, ExtractionConfig};
use crate::error::{ErrorContext, Result, SbomGraphError};
use crate::model::Record;
use crate::writers::write_records;
use serde::Serialize;

/// Per-run extraction behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub on_error: ErrorPolicy,
    /// Flatten nested attributes; when off, only empty lists and internal
    /// keys are dropped
    pub flatten: bool,
    pub delimiter: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::from(&ExtractionConfig::default())
    }
}

impl From<&ExtractionConfig> for ExtractOptions {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            on_error: config.on_error,
            flatten: config.flatten,
            delimiter: config.delimiter.clone(),
        }
    }
}

/// Counters collected while a stream is consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractStats {
    /// Documents pulled from the source successfully
    pub documents_read: usize,
    /// Documents a writer turned into records
    pub documents_written: usize,
    /// Documents dropped because reading or writing failed
    pub documents_skipped: usize,
    /// Documents no writer applies to
    pub documents_unrecognized: usize,
    pub records_yielded: usize,
    /// Records dropped because their identity did not resolve
    pub records_absent: usize,
    /// Edge targets lost with those records
    pub edges_dropped: usize,
    /// Records yielded with their original attributes after cleanup failed
    pub cleanup_failures: usize,
}

/// Drives a document source through format detection and the writers.
pub struct Extractor<S> {
    source: S,
    options: ExtractOptions,
}

impl<S: DocumentSource> Extractor<S> {
    pub fn new(source: S, options: ExtractOptions) -> Self {
        Self { source, options }
    }

    /// Build an extractor from the `extraction` config section.
    pub fn from_config(source: S, config: &ExtractionConfig) -> Self {
        Self::new(source, ExtractOptions::from(config))
    }

    /// Lazy sequence of records across all documents of the source.
    pub fn records(self) -> RecordStream<S> {
        RecordStream {
            source: self.source,
            options: self.options,
            pending: Vec::new().into_iter(),
            stats: ExtractStats::default(),
            finished: false,
        }
    }
}

/// Iterator returned by [`Extractor::records`].
///
/// With [`ErrorPolicy::Abort`] the first failing document is yielded as an
/// `Err` and the stream ends. With [`ErrorPolicy::Skip`] failures are logged
/// and counted and the stream moves on to the next document.
pub struct RecordStream<S> {
    source: S,
    options: ExtractOptions,
    pending: std::vec::IntoIter<Record>,
    stats: ExtractStats,
    finished: bool,
}

impl<S: DocumentSource> RecordStream<S> {
    /// Counters so far; final once the stream returned `None`.
    pub fn stats(&self) -> &ExtractStats {
        &self.stats
    }

    /// Apply the error policy. Returns the error when the stream must stop.
    fn fail(&mut self, err: SbomGraphError) -> Option<SbomGraphError> {
        match self.options.on_error {
            ErrorPolicy::Abort => {
                self.finished = true;
                Some(err)
            }
            ErrorPolicy::Skip => {
                tracing::error!("Skipping document: {}", err);
                self.stats.documents_skipped += 1;
                None
            }
        }
    }

    /// Turn a writer record into a yielded one, or drop it.
    fn finish(&mut self, mut record: Record) -> Option<Record> {
        if record.identity.is_none() {
            let edges = record.edges.target_count();
            tracing::info!(
                "Dropping {} record with unresolved identity and {} edges",
                record.kind,
                edges
            );
            tracing::debug!("Dropped record attributes: {:?}", record.attributes);
            self.stats.records_absent += 1;
            self.stats.edges_dropped += edges;
            return None;
        }

        if self.options.flatten {
            match clean_attributes(&record.attributes, &self.options.delimiter) {
                Ok(cleaned) => record.attributes = cleaned,
                Err(err) => {
                    tracing::error!(
                        "Failed to clean attributes of {}: {}",
                        record.identity().unwrap_or_default(),
                        err
                    );
                    self.stats.cleanup_failures += 1;
                }
            }
        } else {
            record.attributes = prune_attributes(&record.attributes);
        }

        self.stats.records_yielded += 1;
        Some(record)
    }
}

impl<S: DocumentSource> Iterator for RecordStream<S> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.next() {
                if let Some(record) = self.finish(record) {
                    return Some(Ok(record));
                }
                continue;
            }

            if self.finished {
                return None;
            }

            let document = match self.source.next() {
                Some(Ok(document)) => document,
                Some(Err(err)) => match self.fail(err) {
                    Some(err) => return Some(Err(err)),
                    None => continue,
                },
                None => {
                    self.finished = true;
                    return None;
                }
            };
            self.stats.documents_read += 1;

            let written = write_records(&document.content)
                .with_context(|| format!("document {}", document.origin));
            match written {
                Ok(Some(records)) => {
                    tracing::info!("Wrote {} records from {}", records.len(), document.origin);
                    self.stats.documents_written += 1;
                    self.pending = records.into_iter();
                }
                Ok(None) => {
                    tracing::info!(
                        "Skipping {}: neither a CycloneDX nor an SPDX document",
                        document.origin
                    );
                    self.stats.documents_unrecognized += 1;
                }
                Err(err) => {
                    if let Some(err) = self.fail(err) {
                        return Some(Err(err));
                    }
                }
            }
        }
    }
}
