use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::{PaperRecord, PaperSource, Source, SourceError};

const BASE_URL: &str = "https://export.arxiv.org/api/query";
const USER_AGENT: &str = concat!("paper-finder/", env!("CARGO_PKG_VERSION"));
const DEFAULT_LIMIT: u32 = 5;

pub struct ArxivClient {
    client: reqwest::Client,
    base_url: String,
}

impl ArxivClient {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL.to_string())
    }

    pub(crate) fn with_base_url(base_url: String) -> Self {
        Self {
            // Custom identifier so the export API doesn't block us.
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .unwrap(),
            base_url,
        }
    }

    async fn try_search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<PaperRecord>, SourceError> {
        let url = format!(
            "{}?search_query={}&start=0&max_results={}",
            self.base_url,
            urlencoding::encode(query),
            max_results
        );
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status(status));
        }
        let body = resp.text().await?;
        parse_atom_feed(&body)
    }
}

#[async_trait]
impl PaperSource for ArxivClient {
    fn name(&self) -> &'static str {
        "arxiv"
    }

    fn default_limit(&self) -> u32 {
        DEFAULT_LIMIT
    }

    async fn search(&self, query: &str, max_results: u32) -> Vec<PaperRecord> {
        match self.try_search(query, max_results).await {
            Ok(records) => records,
            Err(e) => {
                // arXiv contributes nothing on failure, not even a placeholder.
                tracing::error!("arXiv fetch failed: {}", e);
                Vec::new()
            }
        }
    }
}

fn parse_atom_feed(xml: &str) -> Result<Vec<PaperRecord>, SourceError> {
    let mut reader = Reader::from_str(xml);
    let mut papers = Vec::new();
    let mut in_entry = false;
    let mut in_author = false;
    let mut current_tag = String::new();
    let mut title = String::new();
    let mut summary = String::new();
    let mut entry_id = String::new();
    let mut link_alt = String::new();
    let mut authors: Vec<String> = Vec::new();
    let mut author_name = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if tag == "entry" {
                    in_entry = true;
                    title.clear();
                    summary.clear();
                    entry_id.clear();
                    link_alt.clear();
                    authors.clear();
                } else if in_entry {
                    current_tag = tag.clone();
                    if tag == "author" {
                        in_author = true;
                        author_name.clear();
                    }
                    if tag == "link" {
                        capture_alternate_link(&e, &mut link_alt);
                    }
                }
            }
            Ok(Event::Empty(e)) if in_entry => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if tag == "link" {
                    capture_alternate_link(&e, &mut link_alt);
                }
            }
            Ok(Event::Text(e)) if in_entry => {
                let text = e.unescape().unwrap_or_default().to_string();
                match current_tag.as_str() {
                    "title" => title.push_str(&text),
                    "summary" => summary.push_str(&text),
                    "id" if entry_id.is_empty() => entry_id = text,
                    "name" if in_author => author_name.push_str(&text),
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if tag == "entry" && in_entry {
                    in_entry = false;
                    if !title.trim().is_empty() {
                        let joined = authors.join(", ");
                        papers.push(PaperRecord {
                            title: title.trim().replace('\n', " "),
                            authors: if joined.is_empty() {
                                "N/A".to_string()
                            } else {
                                joined
                            },
                            publication: None,
                            summary: Some(summary.trim().to_string()),
                            link: if link_alt.is_empty() {
                                entry_id.clone()
                            } else {
                                link_alt.clone()
                            },
                            source: Source::ArXiv,
                        });
                    }
                } else if tag == "author" && in_author {
                    in_author = false;
                    if !author_name.trim().is_empty() {
                        authors.push(author_name.trim().to_string());
                    }
                }
                if tag == current_tag {
                    current_tag.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::Parse(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }
    Ok(papers)
}

/// Remember the entry's abstract-page link. The feed marks it rel="alternate";
/// the pdf link carries title="pdf" and is skipped.
fn capture_alternate_link(e: &quick_xml::events::BytesStart<'_>, link_alt: &mut String) {
    let mut href = String::new();
    let mut rel = String::new();
    let mut title_attr = String::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let val = String::from_utf8_lossy(&attr.value).to_string();
        match key.as_str() {
            "href" => href = val,
            "rel" => rel = val,
            "title" => title_attr = val,
            _ => {}
        }
    }
    if title_attr == "pdf" {
        return;
    }
    if rel == "alternate" || (link_alt.is_empty() && href.contains("/abs/")) {
        *link_alt = href;
    }
}
