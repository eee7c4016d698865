//! End-to-end pipeline tests over mock collaborators.
//!
//! Exercises the search → cache → fetch → extract → aggregate → CSV path
//! without any network or model calls.

use std::sync::Arc;

use curation::testing::{sample_extraction, MockExtractor, MockFetcher, MockSearcher};
use curation::types::{Priority, QueryCategory, SearchQuery};
use curation::{
    aggregate, output, FetchOrchestrator, RequestPacer, UrlCache,
};

fn long_article(marker: &str) -> String {
    format!(
        "{marker} {}",
        "The shoe held up well over a hundred miles of testing. ".repeat(20)
    )
}

fn query(text: &str) -> SearchQuery {
    SearchQuery {
        text: text.to_string(),
        category: QueryCategory::Review,
        priority: Priority::High,
        brand: None,
    }
}

#[tokio::test]
async fn two_sources_consolidate_into_one_product() {
    let searcher = MockSearcher::new()
        .with_urls("Acme Swift 3 review", &["https://a.com/review"])
        .with_urls("best Acme shoes", &["https://b.com/roundup"]);

    let fetcher = MockFetcher::new()
        .with_page("https://a.com/review", long_article("a"))
        .with_page("https://b.com/roundup", long_article("b"));

    let mut from_a = sample_extraction("Acme", "Swift 3");
    from_a.review_content.summary = Some("light and fast".to_string());
    from_a.review_content.pros = vec!["light".into(), "breathable".into()];
    from_a.analysis.sentiment_score = Some(85.0);

    let mut from_b = sample_extraction("Acme", "Swift 3");
    from_b.review_content.summary = Some("a durable daily option".to_string());
    from_b.review_content.pros = vec!["light".into(), "durable".into()];
    from_b.analysis.sentiment_score = Some(95.0);

    let extractor = MockExtractor::new()
        .with_result("https://a.com/review", from_a)
        .with_result("https://b.com/roundup", from_b);

    let orchestrator = FetchOrchestrator::new(
        Arc::new(searcher),
        Arc::new(fetcher),
        Arc::new(extractor),
        RequestPacer::unlimited(),
        6,
    );

    let dir = tempfile::tempdir().unwrap();
    let mut cache = UrlCache::empty(dir.path().join("url_cache.json"));

    let mut records = Vec::new();
    for q in [query("Acme Swift 3 review"), query("best Acme shoes")] {
        records.extend(orchestrator.run(&q, &mut cache).await.records);
    }
    assert_eq!(records.len(), 2);

    let products = aggregate(&records);
    assert_eq!(products.len(), 1);

    let product = &products["Acme_Swift 3"];
    assert_eq!(product.review_count, 2);
    assert_eq!(product.average_sentiment, Some(90.0));
    assert_eq!(
        product.source_urls,
        vec!["https://a.com/review", "https://b.com/roundup"]
    );

    let pros: std::collections::HashSet<_> =
        product.merged_pros.iter().map(String::as_str).collect();
    assert_eq!(pros, ["light", "breathable", "durable"].into_iter().collect());

    // Artifacts land on disk with the canonical row present.
    let csv_path = output::write_canonical_csv(dir.path(), &products).unwrap();
    let csv = std::fs::read_to_string(csv_path).unwrap();
    assert!(csv.contains("Acme,Swift 3"));
    assert!(csv.contains("90.00"));
}

#[tokio::test]
async fn malformed_provider_output_only_loses_its_own_url() {
    let searcher = MockSearcher::new().with_urls(
        "Brooks Ghost review",
        &["https://bad.com/r", "https://good.com/r"],
    );
    let fetcher = MockFetcher::new()
        .with_page("https://bad.com/r", long_article("bad"))
        .with_page("https://good.com/r", long_article("good"));
    let extractor = MockExtractor::new()
        .with_failure("https://bad.com/r")
        .with_result("https://good.com/r", sample_extraction("Brooks", "Ghost 16"));

    let orchestrator = FetchOrchestrator::new(
        Arc::new(searcher),
        Arc::new(fetcher),
        Arc::new(extractor),
        RequestPacer::unlimited(),
        6,
    );

    let dir = tempfile::tempdir().unwrap();
    let mut cache = UrlCache::empty(dir.path().join("url_cache.json"));

    let report = orchestrator.run(&query("Brooks Ghost review"), &mut cache).await;

    // The malformed URL yields no record and no cache write; the other
    // URL in the batch is unaffected.
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.failures, 1);
    assert!(!cache.contains("https://bad.com/r"));
    assert!(cache.contains("https://good.com/r"));

    let products = aggregate(&report.records);
    assert_eq!(products.len(), 1);
    assert!(products.contains_key("Brooks_Ghost 16"));
}

#[tokio::test]
async fn warm_cache_run_makes_no_provider_calls() {
    let searcher = MockSearcher::new().with_urls("q", &["https://a.com/r"]);
    let fetcher = MockFetcher::new().with_page("https://a.com/r", long_article("a"));
    let extractor = Arc::new(
        MockExtractor::new().with_result("https://a.com/r", sample_extraction("On", "Cloudmonster")),
    );

    let orchestrator = FetchOrchestrator::new(
        Arc::new(searcher),
        Arc::new(fetcher),
        extractor.clone(),
        RequestPacer::unlimited(),
        6,
    );

    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("url_cache.json");

    // Cold run: one extraction, then persist.
    let mut cache = UrlCache::empty(&cache_path);
    let cold = orchestrator.run(&query("q"), &mut cache).await;
    cache.persist();
    assert_eq!(extractor.call_count(), 1);
    assert!(!cold.records[0].served_from_cache);

    // Warm run against the reloaded store: zero further provider calls,
    // identical extraction content.
    let mut warm_cache = UrlCache::load(&cache_path);
    let warm = orchestrator.run(&query("q"), &mut warm_cache).await;
    assert_eq!(extractor.call_count(), 1);
    assert!(warm.records[0].served_from_cache);
    assert_eq!(cold.records[0].extraction, warm.records[0].extraction);
}
