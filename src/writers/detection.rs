//! Format detection for parsed SBOM documents.
//!
//! Detection looks at two marker fields only: `bomFormat == "CycloneDX"`
//! selects CycloneDX, otherwise an `SPDXID` member selects SPDX. A CycloneDX
//! marker always wins, so a document carrying both is never routed to SPDX.

use serde::Serialize;
use serde_json::Value;

/// Supported SBOM formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BomFormat {
    CycloneDx,
    Spdx,
}

impl BomFormat {
    /// Human-readable format name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CycloneDx => "CycloneDX",
            Self::Spdx => "SPDX",
        }
    }

    /// Identify the format of a parsed document, if any writer applies.
    #[must_use]
    pub fn detect(document: &Value) -> Option<Self> {
        if document.get("bomFormat").and_then(Value::as_str) == Some("CycloneDX") {
            Some(Self::CycloneDx)
        } else if document.get("SPDXID").is_some() {
            Some(Self::Spdx)
        } else {
            None
        }
    }

    /// Specification version declared by a document of this format.
    ///
    /// SPDX versions are reported without the `SPDX-` prefix.
    #[must_use]
    pub fn version(&self, document: &Value) -> Option<String> {
        match self {
            Self::CycloneDx => document
                .get("specVersion")
                .and_then(Value::as_str)
                .map(str::to_string),
            Self::Spdx => document
                .get("spdxVersion")
                .and_then(Value::as_str)
                .map(|v| v.trim_start_matches("SPDX-").to_string()),
        }
    }
}

impl std::fmt::Display for BomFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of format detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedFormat {
    pub format: BomFormat,
    pub version: Option<String>,
}

/// Detect the format and version of a parsed document.
///
/// Returns `None` when neither format marker is present.
#[must_use]
pub fn detect_format(document: &Value) -> Option<DetectedFormat> {
    BomFormat::detect(document).map(|format| DetectedFormat {
        format,
        version: format.version(document),
    })
}
