//! Unified error types for sbom-graph.
//!
//! Only two conditions abort a document: a structural problem found while
//! writing records, and a failure to acquire the document in the first place.
//! Everything else (unresolved references, unknown relationship types,
//! cleanup failures) is absorbed where it happens with a diagnostic.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sbom-graph operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SbomGraphError {
    /// Structural errors while writing records for one document
    #[error("Failed to write records: {context}")]
    Write {
        context: String,
        #[source]
        source: WriteErrorKind,
    },

    /// Errors while acquiring a raw document
    #[error("Failed to read document: {context}")]
    Source {
        context: String,
        #[source]
        source: SourceErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Structural problems in a document that make it impossible to write.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum WriteErrorKind {
    #[error("Missing required field: {field} in {context}")]
    MissingField { field: String, context: String },

    #[error("Invalid SBOM structure: {0}")]
    InvalidStructure(String),
}

/// Problems acquiring a raw document.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SourceErrorKind {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Document is {size_mb} MB, exceeding the {limit_mb} MB limit")]
    TooLarge { size_mb: u64, limit_mb: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for sbom-graph operations
pub type Result<T> = std::result::Result<T, SbomGraphError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl SbomGraphError {
    /// Create a write error with context
    pub fn write(context: impl Into<String>, source: WriteErrorKind) -> Self {
        Self::Write {
            context: context.into(),
            source,
        }
    }

    /// Create a write error for a missing required field
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::write(
            "missing required field",
            WriteErrorKind::MissingField {
                field: field.into(),
                context: context.into(),
            },
        )
    }

    /// Create a write error for a field holding the wrong JSON type
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::write(
            "invalid structure",
            WriteErrorKind::InvalidStructure(message.into()),
        )
    }

    /// Create a source error with context
    pub fn source_error(context: impl Into<String>, source: SourceErrorKind) -> Self {
        Self::Source {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the error came from the structure of a document rather than
    /// from acquiring it.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for SbomGraphError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for SbomGraphError {
    fn from(err: serde_json::Error) -> Self {
        Self::source_error(
            "JSON deserialization",
            SourceErrorKind::InvalidJson(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The new context is prepended to any existing context, so the final message
/// reads from the outermost operation inward.
///
/// # Example
///
/// ```ignore
/// use sbom_graph::error::ErrorContext;
///
/// let records = write_records(value)
///     .with_context(|| format!("document {}", origin))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure (lazy evaluation).
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<SbomGraphError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: SbomGraphError, new_ctx: &str) -> SbomGraphError {
    match err {
        SbomGraphError::Write {
            context: existing,
            source,
        } => SbomGraphError::Write {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SbomGraphError::Source {
            context: existing,
            source,
        } => SbomGraphError::Source {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SbomGraphError::Io {
            path,
            message,
            source,
        } => SbomGraphError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        SbomGraphError::Config(msg) => SbomGraphError::Config(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together as "`new`: `existing`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}
