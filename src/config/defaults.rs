//! Default values and named presets for sbom-graph.

use super::types::{AppConfig, ErrorPolicy, ExtractionConfig};

// ============================================================================
// Default Values
// ============================================================================

/// Files above this size are rejected by the file source.
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 512;

/// Delimiter between flattened attribute key segments.
pub const DEFAULT_DELIMITER: &str = crate::extract::DEFAULT_DELIMITER;

pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";

pub const DEFAULT_GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

pub const DEFAULT_GITHUB_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Configuration Presets
// ============================================================================

/// Named configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Abort on the first bad document, flatten attributes
    Default,
    /// Skip bad documents and keep going
    Lenient,
    /// Keep nested attributes as-is
    Raw,
}

impl ConfigPreset {
    /// Get the preset name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Lenient => "lenient",
            Self::Raw => "raw",
        }
    }

    /// Parse a preset from a string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" | "strict" => Some(Self::Default),
            "lenient" | "skip" => Some(Self::Lenient),
            "raw" | "nested" => Some(Self::Raw),
            _ => None,
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Default => "Stop at the first document that cannot be written",
            Self::Lenient => "Log and skip documents that cannot be read or written",
            Self::Raw => "Emit attributes without flattening nested objects",
        }
    }

    /// Get all available presets.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Default, Self::Lenient, Self::Raw]
    }
}

impl std::fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl AppConfig {
    /// Create a configuration from a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Default => Self::default(),
            ConfigPreset::Lenient => Self {
                extraction: ExtractionConfig {
                    on_error: ErrorPolicy::Skip,
                    ..ExtractionConfig::default()
                },
                ..Self::default()
            },
            ConfigPreset::Raw => Self {
                extraction: ExtractionConfig {
                    flatten: false,
                    ..ExtractionConfig::default()
                },
                ..Self::default()
            },
        }
    }
}
