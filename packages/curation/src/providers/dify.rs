//! Dify workflow extractor.
//!
//! Unlike the direct chat-completion providers, Dify runs a hosted
//! workflow: one blocking HTTP round trip carrying the workflow identity,
//! with the model call happening server-side. The response envelope nests
//! the workflow outputs one level deeper (`data.outputs`); when that inner
//! object is empty the whole `data` object is used instead.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::secrets::SecretString;
use crate::tokens::estimate_tokens;
use crate::traits::Extractor;
use crate::types::ExtractionResult;

use super::parse::parse_extraction;

const TIMEOUT_SECS: u64 = 120;

pub struct DifyExtractor {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    workflow_id: Option<String>,
    /// Character cap on the article text sent to the workflow.
    max_text_length: usize,
    /// Token ceiling used only for the oversize warning; the workflow does
    /// its own budgeting server-side.
    max_tokens: usize,
}

impl DifyExtractor {
    pub fn new(
        api_key: SecretString,
        base_url: impl Into<String>,
        workflow_id: Option<String>,
        max_text_length: usize,
        max_tokens: usize,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(TIMEOUT_SECS))
                .build()
                .expect("failed to build HTTP client"),
            api_key,
            base_url: base_url.into(),
            workflow_id,
            max_text_length,
            max_tokens,
        }
    }

    /// Truncate the article to the configured character cap.
    fn clamp_text<'a>(&self, article_text: &'a str) -> &'a str {
        match article_text.char_indices().nth(self.max_text_length) {
            Some((offset, _)) => &article_text[..offset],
            None => article_text,
        }
    }
}

/// Pull the workflow outputs out of the response envelope.
///
/// Preference order: `data.outputs` when non-empty, then `data`, then a
/// top-level `outputs`, then the body itself.
fn unwrap_envelope(body: &Value) -> Value {
    if let Some(data) = body.get("data").filter(|d| d.is_object()) {
        match data.get("outputs") {
            Some(outputs) if outputs.as_object().is_some_and(|o| !o.is_empty()) => {
                outputs.clone()
            }
            _ => data.clone(),
        }
    } else {
        body.get("outputs").cloned().unwrap_or_else(|| body.clone())
    }
}

/// Interpret workflow outputs as an extraction.
///
/// Workflows emit either a `text` field holding the model's raw output or
/// the structured object directly.
fn extraction_from_outputs(outputs: &Value) -> ProviderResult<ExtractionResult> {
    if let Some(text) = outputs.get("text").and_then(Value::as_str) {
        return parse_extraction(text);
    }
    serde_json::from_value(outputs.clone()).map_err(|err| ProviderError::MalformedResponse {
        detail: format!("workflow outputs not an extraction: {err}"),
    })
}

#[async_trait]
impl Extractor for DifyExtractor {
    async fn extract(
        &self,
        article_text: &str,
        source_url: &str,
    ) -> ProviderResult<ExtractionResult> {
        let text = self.clamp_text(article_text);
        if text.len() < article_text.len() {
            debug!(
                url = %source_url,
                original_chars = article_text.chars().count(),
                sent_chars = text.chars().count(),
                "article clamped for workflow input"
            );
        }

        let estimated = estimate_tokens(text);
        if estimated > self.max_tokens {
            warn!(
                url = %source_url,
                estimated_tokens = estimated,
                limit = self.max_tokens,
                "workflow input likely exceeds the model's token budget"
            );
        }

        let mut payload = json!({
            "inputs": {
                "article_text": text,
                "source_url": source_url,
            },
            "response_mode": "blocking",
            "user": "api_user",
        });

        // With a workflow id the canonical run endpoint applies; without
        // one the base URL is assumed to be a custom endpoint.
        let endpoint = match &self.workflow_id {
            Some(id) => {
                payload["workflow_id"] = Value::String(id.clone());
                format!("{}/workflows/run", self.base_url)
            }
            None => self.base_url.clone(),
        };

        info!(url = %source_url, endpoint = %endpoint, "calling Dify workflow");

        let response = self
            .client
            .post(&endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, TIMEOUT_SECS))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                detail: detail.chars().take(500).collect(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, TIMEOUT_SECS))?;

        let outputs = unwrap_envelope(&body);
        debug!(
            url = %source_url,
            output_keys = outputs.as_object().map(|o| o.len()).unwrap_or(0),
            "workflow responded"
        );

        extraction_from_outputs(&outputs)
    }

    fn name(&self) -> &'static str {
        "dify"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_prefers_nested_outputs() {
        let body = json!({
            "task_id": "t1",
            "workflow_run_id": "w1",
            "data": {
                "outputs": {"text": "{\"analysis\": {\"sentiment_score\": 70}}"},
                "status": "succeeded"
            }
        });
        let outputs = unwrap_envelope(&body);
        assert!(outputs.get("text").is_some());
        assert!(outputs.get("status").is_none());
    }

    #[test]
    fn empty_outputs_fall_back_to_data() {
        let body = json!({
            "data": {
                "outputs": {},
                "text": "{\"product_info\": {}}"
            }
        });
        let outputs = unwrap_envelope(&body);
        assert!(outputs.get("text").is_some());
    }

    #[test]
    fn missing_data_falls_back_to_top_level() {
        let body = json!({"outputs": {"text": "{}"}});
        let outputs = unwrap_envelope(&body);
        assert!(outputs.get("text").is_some());

        let bare = json!({"text": "{}"});
        assert_eq!(unwrap_envelope(&bare), bare);
    }

    #[test]
    fn outputs_text_field_is_parsed() {
        let outputs = json!({"text": "{\"product_info\": {\"brand_name\": \"On\"}}"});
        let result = extraction_from_outputs(&outputs).unwrap();
        assert_eq!(result.product_info.brand_name.as_deref(), Some("On"));
    }

    #[test]
    fn structured_outputs_parse_directly() {
        let outputs = json!({"product_info": {"brand_name": "Saucony"}, "specs": {}});
        let result = extraction_from_outputs(&outputs).unwrap();
        assert_eq!(result.product_info.brand_name.as_deref(), Some("Saucony"));
    }

    #[test]
    fn clamp_respects_char_boundaries() {
        let extractor = DifyExtractor::new(
            SecretString::new("key"),
            "https://api.dify.ai/v1",
            None,
            3,
            2048,
        );
        assert_eq!(extractor.clamp_text("日本語のテキスト"), "日本語");
        assert_eq!(extractor.clamp_text("ab"), "ab");
    }
}
