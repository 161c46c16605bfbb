use async_trait::async_trait;
use serde::Deserialize;

use super::{PaperRecord, PaperSource, Source, SourceError, SUMMARY_FALLBACK};

const BASE_URL: &str = "https://core.ac.uk:443/api-v2";
const DEFAULT_LIMIT: u32 = 3;

/// CORE requires an API key. The key is handed in at construction time
/// (loaded once by `Config`), never read from the environment here. Auth is
/// the `apiKey` query parameter, which is what the CORE v2 search endpoint
/// expects for URL-path queries.
pub struct CoreClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoreClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(BASE_URL.to_string(), api_key)
    }

    pub(crate) fn with_base_url(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(concat!("paper-finder/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap(),
            base_url,
            api_key,
        }
    }

    async fn try_search(
        &self,
        api_key: &str,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<PaperRecord>, SourceError> {
        let url = format!(
            "{}/search/{}?apiKey={}&page=1&pageSize={}",
            self.base_url,
            urlencoding::encode(query),
            api_key,
            max_results
        );
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status(status));
        }
        let body: CoreResponse = resp.json().await?;
        // The endpoint does not always honor pageSize; cap client-side too.
        Ok(body
            .data
            .iter()
            .take(max_results as usize)
            .map(item_to_record)
            .collect())
    }
}

#[async_trait]
impl PaperSource for CoreClient {
    fn name(&self) -> &'static str {
        "core"
    }

    fn default_limit(&self) -> u32 {
        DEFAULT_LIMIT
    }

    async fn search(&self, query: &str, max_results: u32) -> Vec<PaperRecord> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("CORE_API_KEY not set; skipping CORE search");
            return vec![PaperRecord::placeholder(
                "Missing CORE API Key",
                Source::Core,
            )];
        };
        match self.try_search(api_key, query, max_results).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("CORE fetch failed: {}", e);
                vec![PaperRecord::placeholder(
                    format!("CORE API error: {}", e),
                    Source::Core,
                )]
            }
        }
    }
}

#[derive(Deserialize)]
struct CoreResponse {
    #[serde(default)]
    data: Vec<CoreItem>,
}

#[derive(Deserialize)]
struct CoreItem {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    publisher: Option<String>,
    description: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(rename = "downloadUrl")]
    download_url: Option<String>,
    #[serde(rename = "fullTextLink")]
    full_text_link: Option<String>,
}

fn item_to_record(item: &CoreItem) -> PaperRecord {
    // CORE payloads rarely populate authors.
    let authors = item.authors.join(", ");
    PaperRecord {
        title: item.title.clone().unwrap_or_else(|| "N/A".to_string()),
        authors: if authors.is_empty() {
            "N/A".to_string()
        } else {
            authors
        },
        publication: Some(
            item.publisher
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
        ),
        summary: Some(
            item.description
                .clone()
                .or_else(|| item.abstract_text.clone())
                .unwrap_or_else(|| SUMMARY_FALLBACK.to_string()),
        ),
        link: item
            .download_url
            .clone()
            .or_else(|| item.full_text_link.clone())
            .unwrap_or_else(|| "#".to_string()),
        source: Source::Core,
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    #[tokio::test]
    async fn missing_key_yields_placeholder_without_network_call() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET);
            then.status(200).json_body(serde_json::json!({"data": []}));
        });

        let client = CoreClient::with_base_url(server.base_url(), None);
        let results = client.search("semantics", 3).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Missing CORE API Key");
        assert_eq!(results[0].source, Source::Core);
        assert_eq!(mock.hits(), 0);
    }

    #[tokio::test]
    async fn maps_items_and_truncates_to_limit() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search/semantics")
                .query_param("apiKey", "secret")
                .query_param("page", "1")
                .query_param("pageSize", "2");
            then.status(200).json_body(serde_json::json!({
                "data": [
                    {
                        "title": "Open Repositories",
                        "authors": ["Grace Hopper", "Edsger Dijkstra"],
                        "publisher": "CORE Press",
                        "description": "A study of open repositories.",
                        "downloadUrl": "https://core.ac.uk/download/1.pdf"
                    },
                    {
                        "title": "Fallback Fields",
                        "abstract": "Abstract used when description is absent.",
                        "fullTextLink": "https://example.org/fulltext/2"
                    },
                    {
                        "title": "Past the Limit"
                    }
                ]
            }));
        });

        let client = CoreClient::with_base_url(server.base_url(), Some("secret".to_string()));
        let results = client.search("semantics", 2).await;
        mock.assert();
        assert_eq!(results.len(), 2);

        let first = &results[0];
        assert_eq!(first.title, "Open Repositories");
        assert_eq!(first.authors, "Grace Hopper, Edsger Dijkstra");
        assert_eq!(first.publication.as_deref(), Some("CORE Press"));
        assert_eq!(first.summary.as_deref(), Some("A study of open repositories."));
        assert_eq!(first.link, "https://core.ac.uk/download/1.pdf");
        assert_eq!(first.source, Source::Core);

        let second = &results[1];
        assert_eq!(second.authors, "N/A");
        assert_eq!(second.publication.as_deref(), Some("N/A"));
        assert_eq!(
            second.summary.as_deref(),
            Some("Abstract used when description is absent.")
        );
        assert_eq!(second.link, "https://example.org/fulltext/2");
    }

    #[tokio::test]
    async fn bare_item_gets_all_defaults() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(200)
                .json_body(serde_json::json!({"data": [{}]}));
        });

        let client = CoreClient::with_base_url(server.base_url(), Some("secret".to_string()));
        let results = client.search("anything", 3).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "N/A");
        assert_eq!(results[0].authors, "N/A");
        assert_eq!(results[0].summary.as_deref(), Some(SUMMARY_FALLBACK));
        assert_eq!(results[0].link, "#");
    }

    #[tokio::test]
    async fn non_success_status_yields_one_placeholder() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(401);
        });

        let client = CoreClient::with_base_url(server.base_url(), Some("bad".to_string()));
        let results = client.search("semantics", 3).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source, Source::Core);
        assert!(results[0].title.contains("401"), "title: {}", results[0].title);
    }
}
