//! Document sources: where raw SBOM JSON comes from.
//!
//! A source is an iterator of parsed documents. Each document is fetched or
//! read only when the iterator is advanced, so a consumer that stops early
//! never touches the remaining files or repositories.

use crate::config::SourceConfig;
use crate::error::{ErrorContext, Result, SbomGraphError, SourceErrorKind};
use serde_json::Value;
use std::collections::VecDeque;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// One raw document and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    /// File path, repository slug or caller-chosen label
    pub origin: String,
    pub content: Value,
}

impl SourceDocument {
    pub fn new(origin: impl Into<String>, content: Value) -> Self {
        Self {
            origin: origin.into(),
            content,
        }
    }
}

/// Any iterator of documents can feed an extractor.
pub trait DocumentSource: Iterator<Item = Result<SourceDocument>> {}

impl<T> DocumentSource for T where T: Iterator<Item = Result<SourceDocument>> {}

// ============================================================================
// Local files
// ============================================================================

/// Reads SBOM files and directories of SBOM files.
///
/// Paths are visited in the order given. A directory is walked recursively
/// in file-name order and only files with a configured extension are read.
pub struct FileSource {
    pending: VecDeque<PathBuf>,
    walker: Option<walkdir::IntoIter>,
    extensions: Vec<String>,
    max_file_size_mb: u64,
    follow_links: bool,
}

impl FileSource {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>, config: &SourceConfig) -> Self {
        Self {
            pending: paths.into_iter().collect(),
            walker: None,
            extensions: config.extensions.clone(),
            max_file_size_mb: config.max_file_size_mb,
            follow_links: config.follow_links,
        }
    }

    fn wants(&self, path: &Path) -> bool {
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    fn load(&self, path: &Path) -> Result<SourceDocument> {
        let origin = path.display().to_string();

        let metadata = std::fs::metadata(path).map_err(|e| SbomGraphError::io(path, e))?;
        if metadata.len() > self.max_file_size_mb.saturating_mul(BYTES_PER_MB) {
            return Err(SbomGraphError::source_error(
                origin,
                SourceErrorKind::TooLarge {
                    size_mb: metadata.len() / BYTES_PER_MB,
                    limit_mb: self.max_file_size_mb,
                },
            ));
        }

        tracing::debug!("Reading {}", origin);
        let content = std::fs::read_to_string(path).map_err(|e| SbomGraphError::io(path, e))?;
        let value: Value = serde_json::from_str(&content).context(origin.clone())?;
        Ok(SourceDocument::new(origin, value))
    }
}

impl Iterator for FileSource {
    type Item = Result<SourceDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(walker) = self.walker.as_mut() {
                match walker.next() {
                    Some(Ok(entry)) => {
                        if entry.file_type().is_file() && self.wants(entry.path()) {
                            return Some(self.load(entry.path()));
                        }
                    }
                    Some(Err(err)) => {
                        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                        return Some(Err(SbomGraphError::io(path, std::io::Error::from(err))));
                    }
                    None => self.walker = None,
                }
                continue;
            }

            let path = self.pending.pop_front()?;
            if path.is_dir() {
                tracing::debug!("Walking {}", path.display());
                self.walker = Some(
                    walkdir::WalkDir::new(&path)
                        .follow_links(self.follow_links)
                        .sort_by_file_name()
                        .into_iter(),
                );
            } else {
                return Some(self.load(&path));
            }
        }
    }
}

// ============================================================================
// In-memory documents
// ============================================================================

/// Documents that are already parsed, e.g. received over another channel.
#[derive(Debug, Default)]
pub struct MemorySource {
    documents: VecDeque<SourceDocument>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document labelled with `origin`.
    #[must_use]
    pub fn with_document(mut self, origin: impl Into<String>, content: Value) -> Self {
        self.push(origin, content);
        self
    }

    pub fn push(&mut self, origin: impl Into<String>, content: Value) {
        self.documents.push_back(SourceDocument::new(origin, content));
    }
}

impl Iterator for MemorySource {
    type Item = Result<SourceDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        self.documents.pop_front().map(Ok)
    }
}

impl FromIterator<Value> for MemorySource {
    /// Label each document with its position, starting at 0.
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut source = Self::new();
        for (index, content) in iter.into_iter().enumerate() {
            source.push(format!("document-{index}"), content);
        }
        source
    }
}

// ============================================================================
// Concatenation
// ============================================================================

/// Drains each source in turn.
#[derive(Default)]
pub struct ChainSource {
    sources: VecDeque<Box<dyn DocumentSource>>,
}

impl ChainSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source after the ones already added.
    #[must_use]
    pub fn with(mut self, source: impl DocumentSource + 'static) -> Self {
        self.sources.push_back(Box::new(source));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Iterator for ChainSource {
    type Item = Result<SourceDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(source) = self.sources.front_mut() {
            if let Some(item) = source.next() {
                return Some(item);
            }
            self.sources.pop_front();
        }
        None
    }
}

// ============================================================================
// GitHub dependency graph
// ============================================================================

#[cfg(feature = "github")]
pub use github::{GithubSource, GithubSourceConfig};

#[cfg(feature = "github")]
mod github {
    use super::SourceDocument;
    use crate::config::GithubConfig;
    use crate::error::{Result, SbomGraphError, SourceErrorKind};
    use reqwest::blocking::Client;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// GitHub API client configuration.
    #[derive(Debug, Clone)]
    pub struct GithubSourceConfig {
        /// Base URL for the GitHub REST API
        pub api_base: String,
        /// Bearer token; anonymous requests are heavily rate limited
        pub token: Option<String>,
        /// Request timeout
        pub timeout: Duration,
    }

    impl From<&GithubConfig> for GithubSourceConfig {
        fn from(config: &GithubConfig) -> Self {
            Self {
                api_base: config.api_base.trim_end_matches('/').to_string(),
                token: config.token(),
                timeout: config.timeout(),
            }
        }
    }

    /// Fetches the SPDX export of each repository's dependency graph.
    pub struct GithubSource {
        client: Client,
        config: GithubSourceConfig,
        repos: VecDeque<String>,
    }

    fn network_error(repo: &str, err: reqwest::Error) -> SbomGraphError {
        SbomGraphError::source_error(
            format!("github:{repo}"),
            SourceErrorKind::Network(err.to_string()),
        )
    }

    impl GithubSource {
        /// Create a source for `repos` (`owner/repo` slugs).
        pub fn new(repos: impl IntoIterator<Item = String>, config: GithubSourceConfig) -> Result<Self> {
            let client = Client::builder()
                .timeout(config.timeout)
                .user_agent(concat!(
                    env!("CARGO_PKG_NAME"),
                    "/",
                    env!("CARGO_PKG_VERSION")
                ))
                .build()
                .map_err(|e| network_error("client", e))?;

            Ok(Self {
                client,
                config,
                repos: repos.into_iter().collect(),
            })
        }

        /// URL of the SBOM export endpoint for one repository.
        #[must_use]
        pub fn sbom_url(&self, repo: &str) -> String {
            format!("{}/repos/{}/dependency-graph/sbom", self.config.api_base, repo)
        }

        fn fetch(&self, repo: &str) -> Result<SourceDocument> {
            let url = self.sbom_url(repo);
            tracing::info!("Fetching SBOM for {} from {}", repo, url);

            let mut request = self
                .client
                .get(&url)
                .header("Accept", "application/vnd.github+json")
                .header("X-GitHub-Api-Version", "2022-11-28");
            if let Some(token) = &self.config.token {
                request = request.bearer_auth(token);
            }

            let response = request.send().map_err(|e| network_error(repo, e))?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                return Err(SbomGraphError::source_error(
                    format!("github:{repo}"),
                    SourceErrorKind::Api {
                        status: status.as_u16(),
                        body,
                    },
                ));
            }

            let mut payload: Value = response.json().map_err(|e| {
                SbomGraphError::source_error(
                    format!("github:{repo}"),
                    SourceErrorKind::InvalidResponse(e.to_string()),
                )
            })?;
            let sbom = payload
                .get_mut("sbom")
                .map(Value::take)
                .filter(Value::is_object)
                .ok_or_else(|| {
                    SbomGraphError::source_error(
                        format!("github:{repo}"),
                        SourceErrorKind::InvalidResponse("response has no 'sbom' object".to_string()),
                    )
                })?;

            Ok(SourceDocument::new(format!("github:{repo}"), sbom))
        }
    }

    impl Iterator for GithubSource {
        type Item = Result<SourceDocument>;

        fn next(&mut self) -> Option<Self::Item> {
            let repo = self.repos.pop_front()?;
            Some(self.fetch(&repo))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_sbom_url() {
            let config = GithubSourceConfig::from(&GithubConfig {
                api_base: "https://ghe.example.com/api/v3/".to_string(),
                token_env: "SBOM_GRAPH_TEST_UNSET_TOKEN".to_string(),
                ..GithubConfig::default()
            });
            assert!(config.token.is_none());

            let source = GithubSource::new(vec!["octo/hello".to_string()], config).unwrap();
            assert_eq!(
                source.sbom_url("octo/hello"),
                "https://ghe.example.com/api/v3/repos/octo/hello/dependency-graph/sbom"
            );
        }
    }
}
