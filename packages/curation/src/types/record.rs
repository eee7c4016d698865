//! Per-article records and the structured extraction payload.
//!
//! [`ExtractionResult`] is the fixed logical schema the providers must
//! produce. Every leaf field is optional: review articles routinely omit
//! specs or pricing, and absence is semantically distinct from zero.
//! Unknown keys in provider output are ignored so the shape stays
//! forward-compatible across prompt revisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::query::QueryCategory;

/// Product identity fields as reported by one article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductInfo {
    pub brand_name: Option<String>,
    pub model_name: Option<String>,
    pub category: Option<String>,
    pub release_year: Option<i32>,
    pub price_usd: Option<f64>,
}

/// Physical shoe specs. All optional; absence means the article did not
/// state the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShoeSpecs {
    pub weight_g: Option<f64>,
    pub drop_mm: Option<f64>,
    pub stack_height_heel_mm: Option<f64>,
    pub stack_height_forefoot_mm: Option<f64>,
}

/// Narrative review content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewContent {
    pub summary: Option<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

/// Model-side judgement of the review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewAnalysis {
    /// 0-100. Zero is a valid (very negative) score, distinct from absent.
    pub sentiment_score: Option<f64>,
    pub recommended_runner_level: Option<String>,
    pub best_for: Option<String>,
}

/// The structured payload extracted from one article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionResult {
    pub product_info: ProductInfo,
    pub specs: ShoeSpecs,
    pub review_content: ReviewContent,
    pub analysis: ReviewAnalysis,
}

impl ExtractionResult {
    /// Derive the product key used for entity resolution.
    ///
    /// Brand and model are concatenated with an underscore, substituting
    /// `"Unknown"` for missing fields, then trimmed. Case-sensitive.
    pub fn product_key(&self) -> String {
        let brand = self
            .product_info
            .brand_name
            .as_deref()
            .unwrap_or("Unknown");
        let model = self
            .product_info
            .model_name
            .as_deref()
            .unwrap_or("Unknown");
        format!("{}_{}", brand, model).trim().to_string()
    }
}

/// One processed (query, url) pair.
///
/// Produced exactly once per pair per run. `extraction` is `None` only for
/// records that reach the aggregator from external adapters with a failed
/// extraction; the orchestrator itself emits no record on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub query: String,

    pub query_category: QueryCategory,

    pub url: String,

    /// Character count of the fetched article. Zero for cache hits, where
    /// the original length is no longer known.
    pub article_length: usize,

    pub extraction: Option<ExtractionResult>,

    pub processed_at: DateTime<Utc>,

    pub served_from_cache: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_key_joins_brand_and_model() {
        let mut result = ExtractionResult::default();
        result.product_info.brand_name = Some("Acme".to_string());
        result.product_info.model_name = Some("Swift 3".to_string());
        assert_eq!(result.product_key(), "Acme_Swift 3");
    }

    #[test]
    fn product_key_falls_back_to_unknown() {
        let mut result = ExtractionResult::default();
        assert_eq!(result.product_key(), "Unknown_Unknown");
        result.product_info.brand_name = Some("Hoka".to_string());
        assert_eq!(result.product_key(), "Hoka_Unknown");
    }

    #[test]
    fn unknown_provider_keys_are_ignored() {
        let json = r#"{
            "product_info": {"brand_name": "Nike", "colorway": "volt"},
            "specs": {"weight_g": 250.0},
            "review_content": {"summary": "solid", "pros": ["light"], "cons": []},
            "analysis": {"sentiment_score": 0},
            "confidence": 0.9
        }"#;
        let parsed: ExtractionResult = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.product_info.brand_name.as_deref(), Some("Nike"));
        assert_eq!(parsed.specs.weight_g, Some(250.0));
        // A zero score parses as present, not absent.
        assert_eq!(parsed.analysis.sentiment_score, Some(0.0));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let parsed: ExtractionResult = serde_json::from_str("{}").unwrap();
        assert!(parsed.product_info.brand_name.is_none());
        assert!(parsed.review_content.pros.is_empty());
        assert!(parsed.analysis.sentiment_score.is_none());
    }
}
