//! Canonical per-product records produced by aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::ShoeSpecs;

/// The consolidated view of one shoe across every source that mentioned it.
///
/// Created the first time a product key is observed during aggregation and
/// mutated by every later record sharing the key. Identity fields and specs
/// are first-writer-wins; list fields accumulate with the caps documented
/// on each field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalProductRecord {
    /// `"{brand}_{model}"` identity this record was merged under.
    pub product_key: String,

    pub brand_name: String,

    pub model_name: String,

    pub category: Option<String>,

    pub release_year: Option<i32>,

    pub price_usd: Option<f64>,

    /// Specs from the first source only; never merged across sources.
    pub specs: ShoeSpecs,

    /// Number of article records in the group, cache hits included.
    pub review_count: usize,

    /// Every source URL in encounter order. Duplicates possible when the
    /// same URL surfaced under two queries.
    pub source_urls: Vec<String>,

    /// Distinct query strings that led to this product.
    pub source_queries: Vec<String>,

    /// Non-empty summaries in encounter order, capped at three.
    pub merged_summaries: Vec<String>,

    /// Deduplicated pros across all sources, capped at ten.
    pub merged_pros: Vec<String>,

    /// Deduplicated cons across all sources, capped at ten.
    pub merged_cons: Vec<String>,

    /// Mean of the sentiment scores that were present, rounded to two
    /// decimals. Absent when no source carried a score.
    pub average_sentiment: Option<f64>,

    pub recommended_runner_level: Option<String>,

    pub best_for: Option<String>,

    /// Most recent `processed_at` across the group.
    pub latest_processed_at: DateTime<Utc>,
}
