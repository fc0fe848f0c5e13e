//! **Turn Software Bills of Materials into property-graph records.**
//!
//! `sbom-graph` reads **CycloneDX** (1.x JSON) and **SPDX** (2.x JSON) documents
//! and normalizes both into one small vocabulary of graph nodes and typed
//! edges, ready to be loaded into a graph database.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: the [`Record`] every writer emits: a [`NodeKind`], an
//!   identity, an attribute map and outgoing edges grouped by [`Relation`].
//! - **[`writers`]**: one writer per format. A writer turns one parsed document
//!   into an ordered list of records and never performs I/O.
//! - **[`extract`]**: the lazy [`RecordStream`] that pulls documents from a
//!   source (files, memory, the GitHub dependency-graph API), dispatches them to
//!   a writer and cleans up every record's attributes.
//! - **[`config`]**: YAML configuration with discovery, validation and a JSON
//!   schema.
//!
//! ## Getting Started
//!
//! ```
//! use sbom_graph::{write_records, NodeKind, Relation};
//! use serde_json::json;
//!
//! let bom = json!({
//!     "bomFormat": "CycloneDX",
//!     "serialNumber": "urn:uuid:1",
//!     "components": [{
//!         "type": "library",
//!         "name": "foo",
//!         "licenses": [{"license": {"id": "MIT"}}]
//!     }]
//! });
//!
//! let records = write_records(&bom).unwrap().expect("CycloneDX is recognized");
//! let license = records.iter().find(|r| r.kind == NodeKind::License).unwrap();
//! assert_eq!(license.identity(), Some("License_mit"));
//! assert_eq!(
//!     license.targets(Relation::LicensedBy).unwrap(),
//!     &[Some("Component_library_foo".to_string())]
//! );
//! ```
//!
//! ## Feature Flags
//!
//! - `github` (default): enables [`extract::GithubSource`], which fetches the
//!   SPDX export of a repository's dependency graph. This adds `reqwest`.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod writers;

// Re-export main types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigPreset, ErrorPolicy, OutputFormat};
pub use config::{ConfigError, Validatable};
pub use error::{ErrorContext, Result, SbomGraphError};
pub use extract::{
    clean_attributes, CleanupError, DocumentSource, ExtractOptions, ExtractStats, Extractor,
    FileSource, MemorySource, RecordStream, SourceDocument,
};
pub use model::{Attributes, Edges, NodeKind, Record, Relation};
pub use writers::{
    detect_format, write_records, BomFormat, CycloneDxWriter, SbomWriter, SpdxWriter,
};
