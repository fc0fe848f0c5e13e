//! SBOM format writers.
//!
//! A writer takes one parsed SBOM document and turns it into the ordered
//! record list described in [`crate::model`]. Writers are pure: they read the
//! document, build records in memory and never perform I/O.
//!
//! ## Usage
//!
//! ```
//! use sbom_graph::writers::write_records;
//! use serde_json::json;
//!
//! let bom = json!({
//!     "bomFormat": "CycloneDX",
//!     "serialNumber": "urn:uuid:1",
//!     "components": [{"type": "library", "name": "foo"}]
//! });
//! let records = write_records(&bom).unwrap().expect("CycloneDX is recognized");
//! assert_eq!(records[0].identity(), Some("Document_urn:uuid:1"));
//! ```

mod cyclonedx;
mod detection;
mod fields;
pub mod license;
mod spdx;
mod traits;

pub use cyclonedx::CycloneDxWriter;
pub use detection::{detect_format, BomFormat, DetectedFormat};
pub use spdx::SpdxWriter;
pub use traits::{RecordBuffer, SbomWriter};

use crate::error::Result;
use crate::model::Record;
use serde_json::Value;

/// Detect the format of `document` and write it with the matching writer.
///
/// Returns `Ok(None)` when no writer applies to the document.
pub fn write_records(document: &Value) -> Result<Option<Vec<Record>>> {
    let Some(format) = BomFormat::detect(document) else {
        return Ok(None);
    };
    let records = match format {
        BomFormat::CycloneDx => CycloneDxWriter::new(document).write_document()?,
        BomFormat::Spdx => SpdxWriter::new(document).write_document()?,
    };
    Ok(Some(records))
}
