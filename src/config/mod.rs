//! Configuration module for sbom-graph.
//!
//! This module provides:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - Named presets
//! - YAML config file loading and discovery
//!
//! # Quick Start
//!
//! ```rust
//! use sbom_graph::config::{AppConfig, ConfigPreset, ErrorPolicy};
//!
//! let config = AppConfig::from_preset(ConfigPreset::Lenient);
//! assert_eq!(config.extraction.on_error, ErrorPolicy::Skip);
//!
//! let config = AppConfig::builder()
//!     .github_repo("octo-org/hello-world")
//!     .delimiter("_")
//!     .build();
//! assert_eq!(config.extraction.delimiter, "_");
//! ```
//!
//! # Configuration File
//!
//! Place a `.sbom-graph.yaml` file in your project root or `~/.config/sbom-graph/`:
//!
//! ```yaml
//! github:
//!   repos: [octo-org/hello-world]
//! extraction:
//!   on_error: skip
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    ConfigPreset, DEFAULT_DELIMITER, DEFAULT_GITHUB_API_BASE, DEFAULT_GITHUB_TIMEOUT_SECS,
    DEFAULT_GITHUB_TOKEN_ENV, DEFAULT_MAX_FILE_SIZE_MB,
};
pub use types::{
    AppConfig, AppConfigBuilder, ErrorPolicy, ExtractionConfig, GithubConfig, OutputConfig,
    OutputFormat, SourceConfig,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    config_search_dirs, discover_config_file, generate_example_config,
    generate_full_example_config, load_config_file, load_or_default, ConfigFileError,
    CONFIG_FILE_NAMES,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// Editors can use it to validate and complete `.sbom-graph.yaml` files.
pub fn generate_json_schema() -> serde_json::Result<String> {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_schema_lists_sections() {
        let schema = generate_json_schema().unwrap();
        for section in ["source", "github", "extraction", "output"] {
            assert!(schema.contains(section), "schema is missing {section}");
        }
    }
}
