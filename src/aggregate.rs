use std::sync::Arc;

use serde::Serialize;

use crate::apis::{PaperRecord, PaperSource, SUMMARY_FALLBACK};

/// What the presentation layer receives: the query as typed plus the merged
/// record list.
#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub papers: Vec<PaperRecord>,
}

/// Fan a query out to every source and merge the outputs.
///
/// Sources run as parallel tasks but the handles are awaited in the order the
/// sources were registered, so the merged list is always source order first,
/// within-source order second, regardless of completion order. A blank query
/// short-circuits without touching any source.
pub async fn aggregate_search(
    sources: &[Arc<dyn PaperSource>],
    query: &str,
    max_results: Option<u32>,
) -> SearchResults {
    if query.trim().is_empty() {
        return SearchResults {
            query: query.to_string(),
            papers: Vec::new(),
        };
    }

    let handles: Vec<_> = sources
        .iter()
        .map(|source| {
            let source = Arc::clone(source);
            let query = query.to_string();
            let limit = max_results.unwrap_or_else(|| source.default_limit());
            tokio::spawn(async move { source.search(&query, limit).await })
        })
        .collect();

    let mut papers = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(records) => papers.extend(records),
            Err(e) => tracing::warn!("source task panicked: {}", e),
        }
    }

    // Sources may leave summary unset; nothing downstream should see that.
    for paper in &mut papers {
        if paper.summary.is_none() {
            paper.summary = Some(SUMMARY_FALLBACK.to_string());
        }
    }

    SearchResults {
        query: query.to_string(),
        papers,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::apis::Source;

    struct StubSource {
        name: &'static str,
        records: Vec<PaperRecord>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(name: &'static str, records: Vec<PaperRecord>) -> Arc<Self> {
            Arc::new(Self {
                name,
                records,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PaperSource for StubSource {
        fn name(&self) -> &'static str {
            self.name
        }

        fn default_limit(&self) -> u32 {
            3
        }

        async fn search(&self, _query: &str, _max_results: u32) -> Vec<PaperRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.records.clone()
        }
    }

    fn record(title: &str, source: Source) -> PaperRecord {
        PaperRecord {
            title: title.to_string(),
            authors: "N/A".to_string(),
            publication: None,
            summary: Some("present".to_string()),
            link: "N/A".to_string(),
            source,
        }
    }

    #[tokio::test]
    async fn preserves_source_order_then_within_source_order() {
        let a = StubSource::new("arxiv", vec![record("a1", Source::ArXiv)]);
        let o = StubSource::new(
            "openalex",
            vec![record("o1", Source::OpenAlex), record("o2", Source::OpenAlex)],
        );
        let c = StubSource::new("core", vec![]);
        let sources: Vec<Arc<dyn PaperSource>> = vec![a, o, c];

        let results = aggregate_search(&sources, "anything", None).await;
        let titles: Vec<_> = results.papers.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["a1", "o1", "o2"]);
    }

    #[tokio::test]
    async fn backfills_missing_summaries() {
        let mut bare = record("no summary", Source::Core);
        bare.summary = None;
        let src = StubSource::new("core", vec![bare, record("has summary", Source::Core)]);
        let sources: Vec<Arc<dyn PaperSource>> = vec![src];

        let results = aggregate_search(&sources, "anything", None).await;
        assert_eq!(results.papers[0].summary.as_deref(), Some(SUMMARY_FALLBACK));
        assert_eq!(results.papers[1].summary.as_deref(), Some("present"));
        assert!(results.papers.iter().all(|p| p.summary.is_some()));
    }

    #[tokio::test]
    async fn blank_query_short_circuits_without_calling_sources() {
        let a = StubSource::new("arxiv", vec![record("a1", Source::ArXiv)]);
        let b = StubSource::new("openalex", vec![record("o1", Source::OpenAlex)]);
        let sources: Vec<Arc<dyn PaperSource>> =
            vec![Arc::clone(&a) as Arc<dyn PaperSource>, Arc::clone(&b) as _];

        for query in ["", "   ", "\t\n"] {
            let results = aggregate_search(&sources, query, None).await;
            assert_eq!(results.query, query);
            assert!(results.papers.is_empty());
        }
        assert_eq!(a.calls.load(Ordering::SeqCst), 0);
        assert_eq!(b.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn query_is_echoed_back() {
        let sources: Vec<Arc<dyn PaperSource>> =
            vec![StubSource::new("arxiv", vec![record("a1", Source::ArXiv)])];
        let results = aggregate_search(&sources, "spin glasses", None).await;
        assert_eq!(results.query, "spin glasses");
        assert_eq!(results.papers.len(), 1);
    }
}
