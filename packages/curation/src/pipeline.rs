//! Run-level sequencing.
//!
//! Drives the planned query batch through the orchestrator, persists the
//! cache as it goes, and always reaches aggregation and artifact output
//! with whatever records were produced. No single URL or query failure
//! aborts a run, and cancellation flushes the cache before returning.

use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::aggregate::aggregate;
use crate::cache::UrlCache;
use crate::config::PipelineConfig;
use crate::orchestrator::FetchOrchestrator;
use crate::output::{write_all_records, write_canonical_csv, write_query_records};
use crate::planner::plan_all_queries;
use crate::types::{ArticleRecord, CanonicalProductRecord, SearchQuery};

/// Persist the cache after this many queries, bounding loss on a crash.
const CACHE_PERSIST_INTERVAL: usize = 10;

/// Counts reported at the end of a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub queries_planned: usize,
    pub queries_processed: usize,
    pub records: usize,
    pub cache_hits: usize,
    pub fresh_extractions: usize,
    pub failures: usize,
    pub products: usize,
    pub cancelled: bool,
}

impl RunSummary {
    /// Share of records that skipped provider calls entirely.
    pub fn cache_hit_rate(&self) -> f64 {
        if self.records == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.records as f64
        }
    }
}

/// Sequences the full ingestion-to-aggregation run.
pub struct PipelineDriver {
    orchestrator: FetchOrchestrator,
    cache: UrlCache,
    output_dir: PathBuf,
    single_query: Option<String>,
    brand_pause: Duration,
    cancel: CancellationToken,
}

impl PipelineDriver {
    pub fn new(
        orchestrator: FetchOrchestrator,
        cache: UrlCache,
        config: &PipelineConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            orchestrator,
            cache,
            output_dir: config.output_dir.clone(),
            single_query: config.single_query.clone(),
            brand_pause: Duration::from_secs(config.brand_pause_secs),
            cancel,
        }
    }

    /// Queries for this run: the full plan, or the operator override.
    fn plan(&self) -> Vec<SearchQuery> {
        match &self.single_query {
            Some(text) => {
                info!(query = %text, "single-query mode");
                vec![SearchQuery::ad_hoc(text.clone())]
            }
            None => {
                let queries = plan_all_queries();
                info!(queries = queries.len(), "planned full query batch");
                queries
            }
        }
    }

    /// Run the pipeline to completion (or cancellation).
    ///
    /// Returns the summary alongside the canonical products; artifacts and
    /// the cache store are written as side effects.
    pub async fn run(mut self) -> (RunSummary, IndexMap<String, CanonicalProductRecord>) {
        let queries = self.plan();
        let mut summary = RunSummary {
            queries_planned: queries.len(),
            ..RunSummary::default()
        };

        let mut all_records: Vec<ArticleRecord> = Vec::new();
        let mut current_brand: Option<String> = None;
        let mut brand_records: IndexMap<String, usize> = IndexMap::new();

        for (index, query) in queries.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(
                    processed = summary.queries_processed,
                    planned = queries.len(),
                    "cancellation requested, stopping before next query"
                );
                summary.cancelled = true;
                break;
            }

            // Breathe between brands; the per-request pacer handles the rest.
            if query.brand != current_brand {
                if current_brand.is_some() && !self.brand_pause.is_zero() {
                    info!(
                        pause_secs = self.brand_pause.as_secs(),
                        next_brand = query.brand.as_deref().unwrap_or("unknown"),
                        "brand change, pausing"
                    );
                    tokio::time::sleep(self.brand_pause).await;
                }
                current_brand = query.brand.clone();
            }

            let report = self.orchestrator.run(query, &mut self.cache).await;
            summary.queries_processed += 1;
            summary.cache_hits += report.cache_hits();
            summary.fresh_extractions += report.fresh_extractions();
            summary.failures += report.failures;

            if !report.records.is_empty() {
                if let Err(err) =
                    write_query_records(&self.output_dir, &query.text, &report.records)
                {
                    warn!(query = %query.text, error = %err, "per-query artifact write failed");
                }
                let brand = query.brand.clone().unwrap_or_else(|| "ad hoc".to_string());
                *brand_records.entry(brand).or_default() += report.records.len();
                all_records.extend(report.records);
            }

            if (index + 1) % CACHE_PERSIST_INTERVAL == 0 {
                self.cache.persist();
            }
        }

        summary.records = all_records.len();

        if !all_records.is_empty() {
            if let Err(err) = write_all_records(&self.output_dir, &all_records) {
                warn!(error = %err, "combined artifact write failed");
            }
        }

        let products = aggregate(&all_records);
        summary.products = products.len();

        if !products.is_empty() {
            if let Err(err) = write_canonical_csv(&self.output_dir, &products) {
                warn!(error = %err, "CSV write failed");
            }
        }

        // Always flush, cancelled or not, so paid-for extractions survive.
        self.cache.persist();

        for (brand, count) in &brand_records {
            info!(brand = %brand, records = *count, "brand breakdown");
        }
        info!(
            queries = summary.queries_processed,
            records = summary.records,
            cache_hits = summary.cache_hits,
            fresh = summary.fresh_extractions,
            failures = summary.failures,
            products = summary.products,
            cancelled = summary.cancelled,
            "run complete"
        );

        (summary, products)
    }
}
