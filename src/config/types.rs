//! Configuration types for sbom-graph.

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::{
    DEFAULT_DELIMITER, DEFAULT_GITHUB_API_BASE, DEFAULT_GITHUB_TIMEOUT_SECS,
    DEFAULT_GITHUB_TOKEN_ENV, DEFAULT_MAX_FILE_SIZE_MB,
};

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration loaded from a config file, with CLI
/// flags layered on top.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Local file discovery
    pub source: SourceConfig,
    /// GitHub dependency-graph source
    pub github: GithubConfig,
    /// Record extraction behavior
    pub extraction: ExtractionConfig,
    /// Record output
    pub output: OutputConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the file extensions picked up when walking directories.
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.source.extensions = extensions;
        self
    }

    /// Add a GitHub repository (`owner/repo`) to fetch.
    pub fn github_repo(mut self, repo: impl Into<String>) -> Self {
        self.config.github.repos.push(repo.into());
        self
    }

    /// Set the error policy.
    pub const fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.config.extraction.on_error = policy;
        self
    }

    /// Enable or disable attribute flattening.
    pub const fn flatten(mut self, flatten: bool) -> Self {
        self.config.extraction.flatten = flatten;
        self
    }

    /// Set the flattened key delimiter.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.extraction.delimiter = delimiter.into();
        self
    }

    /// Set the output format.
    pub const fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Set the output file.
    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    /// Build the `AppConfig`.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Sub-configuration Types
// ============================================================================

/// Local file discovery configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SourceConfig {
    /// File extensions (without the dot) read when walking a directory
    pub extensions: Vec<String>,
    /// Files larger than this are rejected
    #[schemars(range(min = 1))]
    pub max_file_size_mb: u64,
    /// Follow symbolic links while walking directories
    pub follow_links: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["json".to_string()],
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            follow_links: false,
        }
    }
}

/// GitHub dependency-graph source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GithubConfig {
    /// Repositories to fetch, as `owner/repo`
    pub repos: Vec<String>,
    /// Environment variable holding the API token
    pub token_env: String,
    /// API base URL
    pub api_base: String,
    /// Request timeout in seconds
    #[schemars(range(min = 1))]
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            repos: Vec::new(),
            token_env: DEFAULT_GITHUB_TOKEN_ENV.to_string(),
            api_base: DEFAULT_GITHUB_API_BASE.to_string(),
            timeout_secs: DEFAULT_GITHUB_TIMEOUT_SECS,
        }
    }
}

impl GithubConfig {
    /// Token read from the configured environment variable, if set.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// What to do when a document cannot be read or written.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop the run at the first failing document
    #[default]
    Abort,
    /// Log the failure and continue with the next document
    Skip,
}

/// Record extraction configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Policy for documents that fail to read or write
    pub on_error: ErrorPolicy,
    /// Flatten nested attributes into delimiter-joined keys
    pub flatten: bool,
    /// Delimiter between flattened key segments
    pub delimiter: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            on_error: ErrorPolicy::Abort,
            flatten: true,
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

/// Record output format.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per line
    #[default]
    Jsonl,
    /// A single pretty-printed JSON array
    Json,
}

/// Output-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormat,
    /// Output file path (None for stdout)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.source.extensions, vec!["json".to_string()]);
        assert_eq!(config.extraction.on_error, ErrorPolicy::Abort);
        assert!(config.extraction.flatten);
        assert_eq!(config.extraction.delimiter, ".");
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.output.format, OutputFormat::Jsonl);
    }

    #[test]
    fn test_builder() {
        let config = AppConfig::builder()
            .github_repo("octo/hello")
            .on_error(ErrorPolicy::Skip)
            .flatten(false)
            .delimiter("_")
            .output_format(OutputFormat::Json)
            .build();

        assert_eq!(config.github.repos, vec!["octo/hello".to_string()]);
        assert_eq!(config.extraction.on_error, ErrorPolicy::Skip);
        assert!(!config.extraction.flatten);
        assert_eq!(config.extraction.delimiter, "_");
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_policy_serializes_lowercase() {
        let yaml = serde_yaml::to_string(&ExtractionConfig {
            on_error: ErrorPolicy::Skip,
            ..ExtractionConfig::default()
        })
        .unwrap();
        assert!(yaml.contains("on_error: skip"));
    }
}
