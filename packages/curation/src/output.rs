//! Run artifact files.
//!
//! Three outputs per run: a JSON array of records per query, one combined
//! JSON array, and a CSV of canonical product records. The CSV is UTF-8
//! with a byte-order mark so spreadsheet tools pick the encoding up.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::info;

use crate::error::Result;
use crate::types::{ArticleRecord, CanonicalProductRecord};

const CSV_HEADER: &[&str] = &[
    "brand_name",
    "model_name",
    "category",
    "release_year",
    "price_usd",
    "weight_g",
    "drop_mm",
    "stack_height_heel_mm",
    "stack_height_forefoot_mm",
    "review_count",
    "urls",
    "queries",
    "summary",
    "pros",
    "cons",
    "sentiment_score",
    "recommended_runner_level",
    "best_for",
    "processed_at",
];

/// Reduce a query string to a filename-safe slug, capped at 50 chars.
pub fn query_slug(query: &str) -> String {
    let filtered: String = query
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect();
    filtered
        .trim()
        .replace(' ', "_")
        .chars()
        .take(50)
        .collect()
}

/// Write one query's records to `results_<slug>.json`.
pub fn write_query_records(
    dir: &Path,
    query: &str,
    records: &[ArticleRecord],
) -> Result<PathBuf> {
    let path = dir.join(format!("results_{}.json", query_slug(query)));
    write_json(&path, records)?;
    Ok(path)
}

/// Write the combined record list to `results_all.json`.
pub fn write_all_records(dir: &Path, records: &[ArticleRecord]) -> Result<PathBuf> {
    let path = dir.join("results_all.json");
    write_json(&path, records)?;
    Ok(path)
}

fn write_json(path: &Path, records: &[ArticleRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(records)?)?;
    info!(path = %path.display(), records = records.len(), "wrote record artifact");
    Ok(())
}

/// Write canonical product records to `reviews_grouped.csv`.
pub fn write_canonical_csv(
    dir: &Path,
    products: &IndexMap<String, CanonicalProductRecord>,
) -> Result<PathBuf> {
    let path = dir.join("reviews_grouped.csv");
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut out = String::new();
    // Byte-order mark for spreadsheet compatibility.
    out.push('\u{feff}');
    out.push_str(&CSV_HEADER.join(","));
    out.push_str("\r\n");

    for product in products.values() {
        let fields = [
            product.brand_name.clone(),
            product.model_name.clone(),
            product.category.clone().unwrap_or_default(),
            opt_to_string(product.release_year),
            opt_to_string(product.price_usd),
            opt_to_string(product.specs.weight_g),
            opt_to_string(product.specs.drop_mm),
            opt_to_string(product.specs.stack_height_heel_mm),
            opt_to_string(product.specs.stack_height_forefoot_mm),
            product.review_count.to_string(),
            product.source_urls.join("; "),
            product.source_queries.join("; "),
            product.merged_summaries.join(" | "),
            product.merged_pros.join(" | "),
            product.merged_cons.join(" | "),
            product
                .average_sentiment
                .map(|s| format!("{s:.2}"))
                .unwrap_or_default(),
            product.recommended_runner_level.clone().unwrap_or_default(),
            product.best_for.clone().unwrap_or_default(),
            product
                .latest_processed_at
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        ];
        let row: Vec<String> = fields.iter().map(|f| escape_csv_field(f)).collect();
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }

    fs::write(&path, out.as_bytes())?;
    info!(path = %path.display(), products = products.len(), "wrote canonical CSV");
    Ok(path)
}

fn opt_to_string<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// RFC-4180-style quoting: fields containing commas, quotes, or line
/// breaks are wrapped in double quotes with inner quotes doubled.
fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
