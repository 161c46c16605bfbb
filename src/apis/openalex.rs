use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use super::{PaperRecord, PaperSource, Source, SourceError, SUMMARY_FALLBACK};

const BASE_URL: &str = "https://api.openalex.org";
const DEFAULT_LIMIT: u32 = 3;

pub struct OpenAlexClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAlexClient {
    /// `email` joins the polite pool when set; it only changes the User-Agent.
    pub fn new(email: Option<String>) -> Self {
        Self::with_base_url(BASE_URL.to_string(), email)
    }

    pub(crate) fn with_base_url(base_url: String, email: Option<String>) -> Self {
        let ua = match email {
            Some(ref e) => format!("paper-finder/{} (mailto:{})", env!("CARGO_PKG_VERSION"), e),
            None => format!("paper-finder/{}", env!("CARGO_PKG_VERSION")),
        };
        Self {
            client: reqwest::Client::builder().user_agent(ua).build().unwrap(),
            base_url,
        }
    }

    async fn try_search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<PaperRecord>, SourceError> {
        let url = format!(
            "{}/works?filter=title.search:{}&per-page={}",
            self.base_url,
            urlencoding::encode(query),
            max_results
        );
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status(status));
        }
        let body: OAResponse = resp.json().await?;
        Ok(body.results.iter().map(work_to_record).collect())
    }
}

#[async_trait]
impl PaperSource for OpenAlexClient {
    fn name(&self) -> &'static str {
        "openalex"
    }

    fn default_limit(&self) -> u32 {
        DEFAULT_LIMIT
    }

    async fn search(&self, query: &str, max_results: u32) -> Vec<PaperRecord> {
        match self.try_search(query, max_results).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("OpenAlex fetch failed: {}", e);
                vec![PaperRecord::placeholder(
                    format!("OpenAlex API error: {}", e),
                    Source::OpenAlex,
                )]
            }
        }
    }
}

#[derive(Deserialize)]
struct OAResponse {
    #[serde(default)]
    results: Vec<OAWork>,
}

#[derive(Deserialize)]
struct OAWork {
    title: Option<String>,
    #[serde(default)]
    authorships: Vec<OAAuthorship>,
    host_venue: Option<OAVenue>,
    abstract_inverted_index: Option<HashMap<String, Vec<usize>>>,
    doi: Option<String>,
}

#[derive(Deserialize)]
struct OAAuthorship {
    author: OAAuthor,
}

#[derive(Deserialize)]
struct OAAuthor {
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct OAVenue {
    display_name: Option<String>,
}

fn work_to_record(w: &OAWork) -> PaperRecord {
    let authors = w
        .authorships
        .iter()
        .filter_map(|a| a.author.display_name.clone())
        .collect::<Vec<_>>()
        .join(", ");
    PaperRecord {
        title: w.title.clone().unwrap_or_else(|| "N/A".to_string()),
        authors: if authors.is_empty() {
            "N/A".to_string()
        } else {
            authors
        },
        publication: Some(
            w.host_venue
                .as_ref()
                .and_then(|v| v.display_name.clone())
                .unwrap_or_else(|| "N/A".to_string()),
        ),
        summary: Some(reconstruct_abstract(w.abstract_inverted_index.as_ref())),
        link: w.doi.clone().unwrap_or_else(|| "N/A".to_string()),
        source: Source::OpenAlex,
    }
}

/// Rebuild an abstract from OpenAlex's inverted-index form: each word maps to
/// the zero-based positions where it occurs. Positions are unique across the
/// whole index, so ordering by position alone reconstructs the text.
pub fn reconstruct_abstract(index: Option<&HashMap<String, Vec<usize>>>) -> String {
    let Some(index) = index else {
        return SUMMARY_FALLBACK.to_string();
    };
    let mut word_positions: Vec<(usize, &str)> = Vec::new();
    for (word, positions) in index {
        for &pos in positions {
            word_positions.push((pos, word.as_str()));
        }
    }
    if word_positions.is_empty() {
        return SUMMARY_FALLBACK.to_string();
    }
    word_positions.sort_unstable_by_key(|&(pos, _)| pos);
    word_positions
        .into_iter()
        .map(|(_, word)| word)
        .collect::<Vec<_>>()
        .join(" ")
}
