//! Mock collaborators for testing.
//!
//! Deterministic, configurable stand-ins for the search, fetch, and
//! extraction seams so pipeline logic can be exercised without network or
//! model calls. Each mock records the calls it receives for assertions.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{ProviderError, ProviderResult};
use crate::traits::{ArticleFetcher, Extractor, WebSearcher, MIN_ARTICLE_CHARS};
use crate::types::ExtractionResult;

/// Build a minimal extraction for `brand`/`model`, enough for keying and
/// aggregation tests.
pub fn sample_extraction(brand: &str, model: &str) -> ExtractionResult {
    let mut result = ExtractionResult::default();
    result.product_info.brand_name = Some(brand.to_string());
    result.product_info.model_name = Some(model.to_string());
    result
}

/// Mock searcher with canned URL lists per query.
#[derive(Default)]
pub struct MockSearcher {
    results: HashMap<String, Vec<String>>,
    calls: Arc<RwLock<Vec<(String, usize)>>>,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_urls(mut self, query: &str, urls: &[&str]) -> Self {
        self.results.insert(
            query.to_string(),
            urls.iter().map(|u| u.to_string()).collect(),
        );
        self
    }

    /// Shared handle to the recorded `(query, max_results)` calls.
    pub fn calls(&self) -> Arc<RwLock<Vec<(String, usize)>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl WebSearcher for MockSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Vec<String> {
        self.calls
            .write()
            .unwrap()
            .push((query.to_string(), max_results));
        let mut urls = self.results.get(query).cloned().unwrap_or_default();
        urls.truncate(max_results);
        urls
    }
}

/// Mock fetcher with canned article bodies per URL.
///
/// Applies the same minimum-length gate as the real fetcher, so short
/// bodies behave like unusable pages.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, text: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), text.into());
        self
    }
}

#[async_trait]
impl ArticleFetcher for MockFetcher {
    async fn fetch_article_text(&self, url: &str) -> Option<String> {
        self.pages
            .get(url)
            .filter(|text| text.chars().count() >= MIN_ARTICLE_CHARS)
            .cloned()
    }
}

/// Mock extractor keyed by source URL.
#[derive(Default)]
pub struct MockExtractor {
    results: RwLock<HashMap<String, ExtractionResult>>,
    failures: RwLock<HashSet<String>>,
    calls: RwLock<Vec<String>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(self, url: &str, result: ExtractionResult) -> Self {
        self.results
            .write()
            .unwrap()
            .insert(url.to_string(), result);
        self
    }

    /// Make extraction fail for `url` with a malformed-response error.
    pub fn with_failure(self, url: &str) -> Self {
        self.failures.write().unwrap().insert(url.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(
        &self,
        _article_text: &str,
        source_url: &str,
    ) -> ProviderResult<ExtractionResult> {
        self.calls.write().unwrap().push(source_url.to_string());

        if self.failures.read().unwrap().contains(source_url) {
            return Err(ProviderError::MalformedResponse {
                detail: "mock failure".to_string(),
            });
        }

        self.results
            .read()
            .unwrap()
            .get(source_url)
            .cloned()
            .ok_or_else(|| ProviderError::MalformedResponse {
                detail: format!("no mock result for {source_url}"),
            })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
