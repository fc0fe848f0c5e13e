//! Detect command handler.

use super::exit_codes;
use crate::config::SourceConfig;
use crate::extract::FileSource;
use crate::writers::detect_format;
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

/// Detection outcome for one input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionReport {
    pub origin: String,
    /// `CycloneDX`, `SPDX`, or `None` when unrecognized or unreadable
    pub format: Option<String>,
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl std::fmt::Display for DetectionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.format, &self.error) {
            (_, Some(error)) => write!(f, "{}\terror: {}", self.origin, error),
            (Some(format), None) => write!(
                f,
                "{}\t{} {}",
                self.origin,
                format,
                self.version.as_deref().unwrap_or("(unknown version)")
            ),
            (None, None) => write!(f, "{}\tunrecognized", self.origin),
        }
    }
}

/// Detect the format of every document under `paths`.
pub fn detect_documents(paths: Vec<PathBuf>, config: &SourceConfig) -> Vec<DetectionReport> {
    FileSource::new(paths, config)
        .map(|document| match document {
            Ok(document) => {
                let detected = detect_format(&document.content);
                DetectionReport {
                    origin: document.origin,
                    format: detected.as_ref().map(|d| d.format.name().to_string()),
                    version: detected.and_then(|d| d.version),
                    error: None,
                }
            }
            Err(err) => DetectionReport {
                origin: "-".to_string(),
                format: None,
                version: None,
                error: Some(err.to_string()),
            },
        })
        .collect()
}

/// Run the detect command, returning the desired exit code.
pub fn run_detect(paths: Vec<PathBuf>, config: &SourceConfig, json: bool) -> Result<i32> {
    let reports = detect_documents(paths, config);

    for report in &reports {
        if json {
            println!("{}", serde_json::to_string(report)?);
        } else {
            println!("{report}");
        }
    }

    if reports.iter().all(|r| r.format.is_some()) {
        Ok(exit_codes::SUCCESS)
    } else {
        Ok(exit_codes::DOCUMENTS_SKIPPED)
    }
}
