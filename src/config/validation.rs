//! Configuration validation for sbom-graph.

use super::types::{AppConfig, ExtractionConfig, GithubConfig, OutputConfig, SourceConfig};
use regex::Regex;
use std::sync::OnceLock;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.source.validate());
        errors.extend(self.github.validate());
        errors.extend(self.extraction.validate());
        errors.extend(self.output.validate());
        errors
    }
}

impl Validatable for SourceConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.extensions.is_empty() {
            errors.push(ConfigError::new(
                "source.extensions",
                "At least one file extension is required",
            ));
        }
        for extension in &self.extensions {
            if extension.is_empty() || extension.starts_with('.') {
                errors.push(ConfigError::new(
                    "source.extensions",
                    format!("Invalid extension '{extension}'. Use the bare extension, e.g. 'json'"),
                ));
            }
        }

        if self.max_file_size_mb == 0 {
            errors.push(ConfigError::new(
                "source.max_file_size_mb",
                "Maximum file size must be at least 1 MB",
            ));
        }

        errors
    }
}

/// `owner/repo` as accepted by the GitHub API.
fn repo_slug_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]*/[A-Za-z0-9._-]+$").ok())
        .as_ref()
}

impl Validatable for GithubConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Some(pattern) = repo_slug_pattern() {
            for repo in &self.repos {
                if !pattern.is_match(repo) {
                    errors.push(ConfigError::new(
                        "github.repos",
                        format!("Invalid repository '{repo}'. Expected 'owner/repo'"),
                    ));
                }
            }
        }

        if !self.api_base.starts_with("https://") && !self.api_base.starts_with("http://") {
            errors.push(ConfigError::new(
                "github.api_base",
                format!("API base must be an http(s) URL, got '{}'", self.api_base),
            ));
        }

        if self.token_env.trim().is_empty() {
            errors.push(ConfigError::new(
                "github.token_env",
                "Token environment variable name cannot be empty",
            ));
        }

        if self.timeout_secs == 0 {
            errors.push(ConfigError::new(
                "github.timeout_secs",
                "Timeout must be at least 1 second",
            ));
        }

        errors
    }
}

impl Validatable for ExtractionConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.delimiter.is_empty() {
            errors.push(ConfigError::new(
                "extraction.delimiter",
                "Delimiter cannot be empty",
            ));
        }
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Some(ref file_path) = self.file {
            if let Some(parent) = file_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    errors.push(ConfigError::new(
                        "output.file",
                        format!("Parent directory does not exist: {}", parent.display()),
                    ));
                }
            }
        }

        errors
    }
}
