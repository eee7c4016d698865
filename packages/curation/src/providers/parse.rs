//! Best-effort JSON recovery from free-form model output.
//!
//! Providers ask for bare JSON, but models still wrap it in fenced code
//! blocks or prose. The fallback order is fixed and testable: fenced
//! ```json block first, then the widest `{...}` span, then failure.

use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::types::ExtractionResult;

/// Locate the JSON payload inside a model response.
pub fn locate_json(response: &str) -> Option<&str> {
    let fenced = regex::Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").unwrap();
    if let Some(caps) = fenced.captures(response) {
        return caps.get(1).map(|m| m.as_str());
    }

    // Widest brace span: first '{' through last '}'.
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&response[start..=end])
}

/// Parse a model response into an [`ExtractionResult`].
///
/// Structural mismatch rejects the record rather than crashing: the error
/// is recoverable at the orchestrator and the URL stays uncached.
pub fn parse_extraction(response: &str) -> ProviderResult<ExtractionResult> {
    let payload = locate_json(response).ok_or_else(|| ProviderError::MalformedResponse {
        detail: format!(
            "no JSON object in response: {}",
            response.chars().take(200).collect::<String>()
        ),
    })?;

    debug!(payload_len = payload.len(), "parsing extraction payload");

    serde_json::from_str(payload).map_err(|err| ProviderError::MalformedResponse {
        detail: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_fenced_block() {
        let response = "Here you go:\n```json\n{\"product_info\": {\"brand_name\": \"Nike\"}}\n```\nignore {\"junk\": 1}";
        let result = parse_extraction(response).unwrap();
        assert_eq!(result.product_info.brand_name.as_deref(), Some("Nike"));
    }

    #[test]
    fn falls_back_to_widest_brace_span() {
        let response = "Sure! {\"product_info\": {\"model_name\": \"Clifton 9\"}} hope that helps";
        let result = parse_extraction(response).unwrap();
        assert_eq!(
            result.product_info.model_name.as_deref(),
            Some("Clifton 9")
        );
    }

    #[test]
    fn bare_json_parses() {
        let result = parse_extraction("{\"analysis\": {\"sentiment_score\": 85}}").unwrap();
        assert_eq!(result.analysis.sentiment_score, Some(85.0));
    }

    #[test]
    fn no_braces_is_malformed() {
        let err = parse_extraction("I could not analyze this article.").unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse { .. }));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = parse_extraction("{not json at all}").unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse { .. }));
    }

    #[test]
    fn locate_spans_first_to_last_brace() {
        let response = "a {\"x\": {\"y\": 1}} b } c";
        // rfind takes the final '}', even past valid JSON; the parse step
        // is what decides validity.
        assert_eq!(locate_json(response), Some("{\"x\": {\"y\": 1}} b }"));
    }
}
