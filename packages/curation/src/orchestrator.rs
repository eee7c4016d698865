//! Per-query fetch orchestration.
//!
//! Drives search → cache check → fetch → extract for one query. The cache
//! is consulted before any network call and is only written on successful
//! extraction, so failed URLs are retried on the next run.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::cache::UrlCache;
use crate::throttle::RequestPacer;
use crate::traits::{ArticleFetcher, Extractor, WebSearcher};
use crate::types::{ArticleRecord, SearchQuery};

/// Outcome of one query, with the counts the run summary needs.
#[derive(Debug, Default)]
pub struct QueryReport {
    pub records: Vec<ArticleRecord>,
    /// URLs the search returned for this query.
    pub urls_found: usize,
    /// URLs where fetch or extraction failed (not cached, retried later).
    pub failures: usize,
}

impl QueryReport {
    pub fn cache_hits(&self) -> usize {
        self.records.iter().filter(|r| r.served_from_cache).count()
    }

    pub fn fresh_extractions(&self) -> usize {
        self.records.len() - self.cache_hits()
    }
}

/// Sequential search-fetch-extract driver for single queries.
pub struct FetchOrchestrator {
    searcher: Arc<dyn WebSearcher>,
    fetcher: Arc<dyn ArticleFetcher>,
    extractor: Arc<dyn Extractor>,
    pacer: RequestPacer,
    results_per_query: usize,
}

impl FetchOrchestrator {
    pub fn new(
        searcher: Arc<dyn WebSearcher>,
        fetcher: Arc<dyn ArticleFetcher>,
        extractor: Arc<dyn Extractor>,
        pacer: RequestPacer,
        results_per_query: usize,
    ) -> Self {
        Self {
            searcher,
            fetcher,
            extractor,
            pacer,
            results_per_query,
        }
    }

    /// Process one query, emitting an [`ArticleRecord`] per usable URL.
    ///
    /// URLs are handled strictly in search order. A cache hit emits a
    /// record without any network call; a fetch or extraction failure
    /// emits nothing and leaves the URL uncached.
    pub async fn run(&self, query: &SearchQuery, cache: &mut UrlCache) -> QueryReport {
        let ceiling = query.priority.result_ceiling(self.results_per_query);
        info!(
            query = %query.text,
            priority = ?query.priority,
            ceiling,
            "processing query"
        );

        self.pacer.acquire().await;
        let urls = self.searcher.search(&query.text, ceiling).await;
        if urls.is_empty() {
            warn!(query = %query.text, "no search results");
            return QueryReport::default();
        }

        let mut report = QueryReport {
            urls_found: urls.len(),
            ..QueryReport::default()
        };

        for (index, url) in urls.iter().enumerate() {
            info!(url = %url, position = index + 1, total = urls.len(), "processing URL");

            if let Some(entry) = cache.get(url) {
                info!(url = %url, "cache hit, skipping fetch and extraction");
                report.records.push(ArticleRecord {
                    query: query.text.clone(),
                    query_category: query.category,
                    url: url.clone(),
                    article_length: 0,
                    extraction: Some(entry.analysis.clone()),
                    processed_at: entry.cached_at,
                    served_from_cache: true,
                });
                continue;
            }

            self.pacer.acquire().await;
            let Some(article_text) = self.fetcher.fetch_article_text(url).await else {
                warn!(query = %query.text, url = %url, "no usable article text");
                report.failures += 1;
                continue;
            };

            let article_length = article_text.chars().count();
            info!(url = %url, chars = article_length, "article text extracted");

            self.pacer.acquire().await;
            match self.extractor.extract(&article_text, url).await {
                Ok(extraction) => {
                    cache.put(url.clone(), extraction.clone());
                    report.records.push(ArticleRecord {
                        query: query.text.clone(),
                        query_category: query.category,
                        url: url.clone(),
                        article_length,
                        extraction: Some(extraction),
                        processed_at: Utc::now(),
                        served_from_cache: false,
                    });
                    info!(url = %url, provider = self.extractor.name(), "extraction succeeded");
                }
                Err(err) => {
                    // Not cached: the URL gets another chance next run.
                    warn!(
                        query = %query.text,
                        url = %url,
                        provider = self.extractor.name(),
                        error = %err,
                        "extraction failed"
                    );
                    report.failures += 1;
                }
            }
        }

        info!(
            query = %query.text,
            records = report.records.len(),
            cache_hits = report.cache_hits(),
            failures = report.failures,
            "query complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_extraction, MockFetcher, MockSearcher, MockExtractor};
    use crate::types::{Priority, QueryCategory};

    fn query(text: &str) -> SearchQuery {
        SearchQuery {
            text: text.to_string(),
            category: QueryCategory::Review,
            priority: Priority::High,
            brand: None,
        }
    }

    fn orchestrator(
        searcher: MockSearcher,
        fetcher: MockFetcher,
        extractor: MockExtractor,
    ) -> (FetchOrchestrator, Arc<MockExtractor>) {
        let extractor = Arc::new(extractor);
        let orchestrator = FetchOrchestrator::new(
            Arc::new(searcher),
            Arc::new(fetcher),
            extractor.clone(),
            RequestPacer::unlimited(),
            6,
        );
        (orchestrator, extractor)
    }

    fn long_article(marker: &str) -> String {
        format!("{marker} {}", "very detailed review text. ".repeat(40))
    }

    #[tokio::test]
    async fn emits_record_per_successful_url() {
        let searcher = MockSearcher::new()
            .with_urls("Hoka review", &["https://a.com/r1", "https://b.com/r2"]);
        let fetcher = MockFetcher::new()
            .with_page("https://a.com/r1", long_article("a"))
            .with_page("https://b.com/r2", long_article("b"));
        let extractor = MockExtractor::new()
            .with_result("https://a.com/r1", sample_extraction("Hoka", "Clifton 9"))
            .with_result("https://b.com/r2", sample_extraction("Hoka", "Mach 6"));

        let (orchestrator, extractor) = orchestrator(searcher, fetcher, extractor);
        let mut cache = UrlCache::empty("unused.json");

        let report = orchestrator.run(&query("Hoka review"), &mut cache).await;

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.failures, 0);
        assert!(report.records.iter().all(|r| !r.served_from_cache));
        assert_eq!(extractor.call_count(), 2);
        // Successful extractions are cached.
        assert!(cache.contains("https://a.com/r1"));
        assert!(cache.contains("https://b.com/r2"));
    }

    #[tokio::test]
    async fn cache_hit_short_circuits_network() {
        let searcher = MockSearcher::new().with_urls("q", &["https://a.com/r1"]);
        let fetcher = MockFetcher::new(); // would fail if consulted
        let extractor = MockExtractor::new(); // would fail if consulted

        let (orchestrator, extractor) = orchestrator(searcher, fetcher, extractor);
        let mut cache = UrlCache::empty("unused.json");
        cache.put("https://a.com/r1", sample_extraction("Nike", "Pegasus 41"));

        let report = orchestrator.run(&query("q"), &mut cache).await;

        assert_eq!(report.records.len(), 1);
        assert!(report.records[0].served_from_cache);
        assert_eq!(report.records[0].article_length, 0);
        assert_eq!(extractor.call_count(), 0);
    }

    #[tokio::test]
    async fn warm_cache_rerun_is_idempotent() {
        let searcher =
            MockSearcher::new().with_urls("q", &["https://a.com/r1"]);
        let fetcher = MockFetcher::new().with_page("https://a.com/r1", long_article("a"));
        let extractor = MockExtractor::new()
            .with_result("https://a.com/r1", sample_extraction("Nike", "Pegasus 41"));

        let (orchestrator, extractor) = orchestrator(searcher, fetcher, extractor);
        let mut cache = UrlCache::empty("unused.json");

        let first = orchestrator.run(&query("q"), &mut cache).await;
        let second = orchestrator.run(&query("q"), &mut cache).await;

        // One extractor call total: the second run was served from cache.
        assert_eq!(extractor.call_count(), 1);
        assert_eq!(second.records.len(), 1);
        assert!(second.records[0].served_from_cache);
        assert_eq!(first.records[0].extraction, second.records[0].extraction);
        assert_eq!(first.records[0].url, second.records[0].url);
        assert_eq!(first.records[0].query, second.records[0].query);
    }

    #[tokio::test]
    async fn short_article_is_rejected_without_extraction() {
        let searcher = MockSearcher::new().with_urls("q", &["https://a.com/r1"]);
        // MockFetcher enforces the minimum-length gate like the real one.
        let fetcher = MockFetcher::new().with_page("https://a.com/r1", "too short");
        let extractor = MockExtractor::new();

        let (orchestrator, extractor) = orchestrator(searcher, fetcher, extractor);
        let mut cache = UrlCache::empty("unused.json");

        let report = orchestrator.run(&query("q"), &mut cache).await;

        assert!(report.records.is_empty());
        assert_eq!(report.failures, 1);
        assert_eq!(extractor.call_count(), 0);
    }

    #[tokio::test]
    async fn failed_extraction_leaves_url_uncached_and_batch_alive() {
        let searcher = MockSearcher::new()
            .with_urls("q", &["https://bad.com/r", "https://good.com/r"]);
        let fetcher = MockFetcher::new()
            .with_page("https://bad.com/r", long_article("bad"))
            .with_page("https://good.com/r", long_article("good"));
        let extractor = MockExtractor::new()
            .with_failure("https://bad.com/r")
            .with_result("https://good.com/r", sample_extraction("Brooks", "Ghost 16"));

        let (orchestrator, _) = orchestrator(searcher, fetcher, extractor);
        let mut cache = UrlCache::empty("unused.json");

        let report = orchestrator.run(&query("q"), &mut cache).await;

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.failures, 1);
        assert_eq!(report.records[0].url, "https://good.com/r");
        // The malformed URL must not be cached, so it is retried next run.
        assert!(!cache.contains("https://bad.com/r"));
        assert!(cache.contains("https://good.com/r"));
    }

    #[tokio::test]
    async fn medium_priority_halves_the_ceiling() {
        let searcher = MockSearcher::new().with_urls("q", &[]);
        let calls = searcher.calls();
        let (orchestrator, _) =
            orchestrator(searcher, MockFetcher::new(), MockExtractor::new());
        let mut cache = UrlCache::empty("unused.json");

        let mut medium = query("q");
        medium.priority = Priority::Medium;
        orchestrator.run(&medium, &mut cache).await;

        // The searcher records the max_results it was asked for:
        // 6 / 2 = 3 for medium priority.
        assert_eq!(*calls.read().unwrap(), vec![("q".to_string(), 3)]);
    }
}
