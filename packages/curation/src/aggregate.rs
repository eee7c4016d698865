//! Entity resolution and record merging.
//!
//! Reduces many noisy per-article records into one canonical record per
//! product key. A pure, single-threaded reduction: for a fixed,
//! order-preserved input list the output is deterministic, including the
//! post-dedup order of pros/cons (insertion-ordered sets).

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::types::{ArticleRecord, CanonicalProductRecord};

/// How many merged summaries a canonical record keeps.
const SUMMARY_CAP: usize = 3;

/// How many deduplicated pros/cons a canonical record keeps.
const PROS_CONS_CAP: usize = 10;

/// Synthetic group key for records that cannot be keyed by brand/model.
fn placeholder_key(url: &str) -> String {
    let prefix: String = url.chars().take(30).collect();
    format!("unknown_{prefix}")
}

/// Merge article records into canonical product records.
///
/// Records without an extraction fall back to a per-URL placeholder key
/// and are excluded from the returned map. Within a group, identity
/// fields, specs, and the analysis recommendation fields come from the
/// first record in encounter order; list fields accumulate across the
/// group with the documented caps.
pub fn aggregate(records: &[ArticleRecord]) -> IndexMap<String, CanonicalProductRecord> {
    let mut groups: IndexMap<String, Vec<&ArticleRecord>> = IndexMap::new();
    let mut unkeyed = 0usize;

    for record in records {
        let key = match &record.extraction {
            Some(extraction) => extraction.product_key(),
            None => {
                unkeyed += 1;
                placeholder_key(&record.url)
            }
        };
        groups.entry(key).or_default().push(record);
    }

    debug!(
        records = records.len(),
        groups = groups.len(),
        unkeyed,
        "grouped records by product key"
    );

    let mut canonical = IndexMap::new();

    for (key, group) in groups {
        // Placeholder groups carry no extraction to merge.
        let Some(first_extraction) = group[0].extraction.as_ref() else {
            continue;
        };

        let mut source_urls = Vec::new();
        let mut source_queries = IndexSet::new();
        let mut summaries = Vec::new();
        let mut pros: IndexSet<String> = IndexSet::new();
        let mut cons: IndexSet<String> = IndexSet::new();
        let mut sentiment_scores = Vec::new();
        let mut latest_processed_at = group[0].processed_at;

        for record in &group {
            source_urls.push(record.url.clone());
            source_queries.insert(record.query.clone());
            latest_processed_at = latest_processed_at.max(record.processed_at);

            let Some(extraction) = record.extraction.as_ref() else {
                continue;
            };

            if let Some(summary) = &extraction.review_content.summary {
                if !summary.trim().is_empty() {
                    summaries.push(summary.clone());
                }
            }
            pros.extend(extraction.review_content.pros.iter().cloned());
            cons.extend(extraction.review_content.cons.iter().cloned());

            // Presence check, not truthiness: a sentiment of 0 counts.
            if let Some(score) = extraction.analysis.sentiment_score {
                sentiment_scores.push(score);
            }
        }

        let average_sentiment = if sentiment_scores.is_empty() {
            None
        } else {
            let mean = sentiment_scores.iter().sum::<f64>() / sentiment_scores.len() as f64;
            Some((mean * 100.0).round() / 100.0)
        };

        summaries.truncate(SUMMARY_CAP);

        let info = &first_extraction.product_info;
        canonical.insert(
            key.clone(),
            CanonicalProductRecord {
                product_key: key,
                brand_name: info.brand_name.clone().unwrap_or_else(|| "Unknown".into()),
                model_name: info.model_name.clone().unwrap_or_else(|| "Unknown".into()),
                category: info.category.clone(),
                release_year: info.release_year,
                price_usd: info.price_usd,
                specs: first_extraction.specs.clone(),
                review_count: group.len(),
                source_urls,
                source_queries: source_queries.into_iter().collect(),
                merged_summaries: summaries,
                merged_pros: pros.into_iter().take(PROS_CONS_CAP).collect(),
                merged_cons: cons.into_iter().take(PROS_CONS_CAP).collect(),
                average_sentiment,
                recommended_runner_level: first_extraction
                    .analysis
                    .recommended_runner_level
                    .clone(),
                best_for: first_extraction.analysis.best_for.clone(),
                latest_processed_at,
            },
        );
    }

    canonical
}
