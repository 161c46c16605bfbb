pub mod arxiv;
pub mod core;
pub mod openalex;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback text used wherever a source yields no abstract.
pub const SUMMARY_FALLBACK: &str = "Summary not available";

/// Provenance of a record, serialized exactly as the upstream APIs are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "arXiv")]
    ArXiv,
    OpenAlex,
    #[serde(rename = "CORE")]
    Core,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::ArXiv => "arXiv",
            Source::OpenAlex => "OpenAlex",
            Source::Core => "CORE",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The uniform record every adapter maps its API's payload into.
///
/// `publication` is never populated for arXiv records and is omitted from
/// serialized output when absent. `summary` may be `None` coming out of an
/// adapter; the aggregator backfills it before anything user-facing sees the
/// record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub title: String,
    pub authors: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub link: String,
    pub source: Source,
}

impl PaperRecord {
    /// A synthetic record standing in for a failed or degraded fetch.
    pub fn placeholder(title: impl Into<String>, source: Source) -> Self {
        Self {
            title: title.into(),
            authors: "N/A".to_string(),
            publication: None,
            summary: None,
            link: "N/A".to_string(),
            source,
        }
    }
}

/// Failures internal to an adapter. These never cross the `search` boundary:
/// each adapter converts them into a placeholder record or an empty list.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("parse error: {0}")]
    Parse(String),
}

#[async_trait]
pub trait PaperSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Per-source result cap applied when the caller does not override it.
    fn default_limit(&self) -> u32;

    /// Fetch and normalize results for `query`. Infallible by contract:
    /// adapters surface their own failures as placeholder records (OpenAlex,
    /// CORE) or an empty list (arXiv).
    async fn search(&self, query: &str, max_results: u32) -> Vec<PaperRecord>;
}
