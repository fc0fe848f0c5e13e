//! Extract command handler.

use super::exit_codes;
use super::output::{OutputTarget, RecordSink};
use crate::config::{AppConfig, ErrorPolicy, OutputFormat, Validatable};
use crate::extract::{ChainSource, Extractor, FileSource};
use anyhow::{bail, Result};
use std::path::PathBuf;

/// Command-line values layered over the loaded configuration.
///
/// Only values the user actually passed override the file.
#[derive(Debug, Clone, Default)]
pub struct ExtractOverrides {
    pub github_repos: Vec<String>,
    pub on_error: Option<ErrorPolicy>,
    pub no_flatten: bool,
    pub delimiter: Option<String>,
    pub format: Option<OutputFormat>,
    pub output_file: Option<PathBuf>,
}

impl ExtractOverrides {
    pub fn apply(&self, config: &mut AppConfig) {
        if !self.github_repos.is_empty() {
            config.github.repos.clone_from(&self.github_repos);
        }
        if let Some(policy) = self.on_error {
            config.extraction.on_error = policy;
        }
        if self.no_flatten {
            config.extraction.flatten = false;
        }
        if let Some(delimiter) = &self.delimiter {
            config.extraction.delimiter.clone_from(delimiter);
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if self.output_file.is_some() {
            config.output.file.clone_from(&self.output_file);
        }
    }
}

/// Build the document source for a run: local paths first, then GitHub.
fn build_source(paths: Vec<PathBuf>, config: &AppConfig) -> Result<ChainSource> {
    let mut source = ChainSource::new();

    if !paths.is_empty() {
        source = source.with(FileSource::new(paths, &config.source));
    }

    if !config.github.repos.is_empty() {
        #[cfg(feature = "github")]
        {
            use crate::extract::{GithubSource, GithubSourceConfig};
            let client_config = GithubSourceConfig::from(&config.github);
            if client_config.token.is_none() {
                tracing::warn!(
                    "{} is not set; GitHub requests are unauthenticated",
                    config.github.token_env
                );
            }
            source = source.with(GithubSource::new(config.github.repos.clone(), client_config)?);
        }
        #[cfg(not(feature = "github"))]
        {
            bail!("GitHub repositories configured but sbom-graph was built without the 'github' feature");
        }
    }

    if source.is_empty() {
        bail!("No input: pass SBOM paths or --github OWNER/REPO");
    }
    Ok(source)
}

/// Run the extract command, returning the desired exit code.
pub fn run_extract(paths: Vec<PathBuf>, config: &AppConfig) -> Result<i32> {
    let errors = config.validate();
    if !errors.is_empty() {
        for error in &errors {
            tracing::error!("Invalid configuration: {}", error);
        }
        bail!("Configuration has {} error(s)", errors.len());
    }

    let source = build_source(paths, config)?;
    let target = OutputTarget::from_option(config.output.file.clone());
    let mut sink = RecordSink::open(&target, config.output.format)?;

    let mut stream = Extractor::from_config(source, &config.extraction).records();
    for item in stream.by_ref() {
        match item {
            Ok(record) => sink.write(&record)?,
            Err(err) => {
                sink.finish()?;
                return Err(anyhow::Error::new(err).context("Extraction aborted"));
            }
        }
    }
    let written = sink.finish()?;

    let stats = stream.stats();
    tracing::info!(
        "Extracted {} records from {} documents ({} skipped, {} unrecognized)",
        written,
        stats.documents_written,
        stats.documents_skipped,
        stats.documents_unrecognized
    );
    if stats.records_absent > 0 || stats.cleanup_failures > 0 {
        tracing::info!(
            "{} unresolved records dropped with {} edges, {} records kept unflattened",
            stats.records_absent,
            stats.edges_dropped,
            stats.cleanup_failures
        );
    }
    if let OutputTarget::File(path) = &target {
        tracing::info!("Records written to {}", path.display());
    }

    if stats.documents_skipped > 0 {
        Ok(exit_codes::DOCUMENTS_SKIPPED)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}
