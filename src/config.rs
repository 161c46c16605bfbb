use std::sync::Arc;

use crate::apis::{self, PaperSource, Source};

/// Server configuration loaded once from environment variables. Adapters get
/// their secrets handed in explicitly instead of reading the environment
/// themselves.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub core_api_key: Option<String>,
    pub openalex_email: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            core_api_key: std::env::var("CORE_API_KEY").ok().filter(|k| !k.is_empty()),
            openalex_email: std::env::var("OPENALEX_EMAIL").ok().filter(|e| !e.is_empty()),
        }
    }

    /// The three sources in presentation order: arXiv, OpenAlex, CORE.
    ///
    /// CORE is registered even without an API key; it answers searches with a
    /// missing-key placeholder rather than being disabled.
    pub fn build_sources(&self) -> Vec<Arc<dyn PaperSource>> {
        vec![
            Arc::new(apis::arxiv::ArxivClient::new()),
            Arc::new(apis::openalex::OpenAlexClient::new(
                self.openalex_email.clone(),
            )),
            Arc::new(apis::core::CoreClient::new(self.core_api_key.clone())),
        ]
    }

    pub fn source_status(&self) -> Vec<SourceStatus> {
        vec![
            SourceStatus {
                name: Source::ArXiv.as_str().into(),
                enabled: true,
                note: "No API key required".into(),
            },
            SourceStatus {
                name: Source::OpenAlex.as_str().into(),
                enabled: true,
                note: if self.openalex_email.is_some() {
                    "Polite pool email set".into()
                } else {
                    "No email (limited rate)".into()
                },
            },
            SourceStatus {
                name: Source::Core.as_str().into(),
                enabled: self.core_api_key.is_some(),
                note: if self.core_api_key.is_some() {
                    "API key set".into()
                } else {
                    "CORE_API_KEY not set; searches return a placeholder".into()
                },
            },
        ]
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SourceStatus {
    pub name: String,
    pub enabled: bool,
    pub note: String,
}
