//! Gemini generateContent extractor.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};
use crate::secrets::SecretString;
use crate::tokens::{estimate_tokens, truncate_to_token_budget};
use crate::traits::Extractor;
use crate::types::ExtractionResult;

use super::parse::parse_extraction;
use super::prompt::{
    article_token_budget, render_prompt, RESPONSE_TOKEN_CAP, SYSTEM_PROMPT, TEMPERATURE,
};

const TIMEOUT_SECS: u64 = 120;

pub struct GeminiExtractor {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    max_tokens: usize,
    base_url: String,
}

impl GeminiExtractor {
    pub fn new(api_key: SecretString, model: impl Into<String>, max_tokens: usize) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(TIMEOUT_SECS))
                .build()
                .expect("failed to build HTTP client"),
            api_key,
            model: model.into(),
            max_tokens,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

#[async_trait]
impl Extractor for GeminiExtractor {
    async fn extract(
        &self,
        article_text: &str,
        source_url: &str,
    ) -> ProviderResult<ExtractionResult> {
        #[derive(Serialize)]
        struct Request<'a> {
            contents: Vec<Content<'a>>,
            #[serde(rename = "generationConfig")]
            generation_config: GenerationConfig,
        }

        #[derive(Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }

        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }

        #[derive(Serialize)]
        struct GenerationConfig {
            temperature: f32,
            #[serde(rename = "maxOutputTokens")]
            max_output_tokens: u32,
            #[serde(rename = "responseMimeType")]
            response_mime_type: &'static str,
        }

        #[derive(Deserialize)]
        struct Response {
            #[serde(default)]
            candidates: Vec<Candidate>,
            #[serde(default, rename = "usageMetadata")]
            usage_metadata: Option<UsageMetadata>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: CandidateContent,
        }

        #[derive(Deserialize)]
        struct CandidateContent {
            #[serde(default)]
            parts: Vec<CandidatePart>,
        }

        #[derive(Deserialize)]
        struct CandidatePart {
            #[serde(default)]
            text: String,
        }

        #[derive(Deserialize)]
        struct UsageMetadata {
            #[serde(default, rename = "promptTokenCount")]
            prompt_token_count: u32,
            #[serde(default, rename = "candidatesTokenCount")]
            candidates_token_count: u32,
        }

        let budget = article_token_budget(self.max_tokens, source_url);
        let truncated = truncate_to_token_budget(article_text, budget);

        // Gemini takes no separate system role here; prepend the framing.
        let full_prompt = format!(
            "{}\n\n{}",
            SYSTEM_PROMPT,
            render_prompt(source_url, truncated)
        );

        info!(
            url = %source_url,
            model = %self.model,
            prompt_tokens_estimate = estimate_tokens(&full_prompt),
            "calling Gemini"
        );

        let request = Request {
            contents: vec![Content {
                parts: vec![Part { text: &full_prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: RESPONSE_TOKEN_CAP,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", self.api_key.expose())])
            .json(&request)
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

        let parsed: Response = response
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, TIMEOUT_SECS))?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                url = %source_url,
                prompt_tokens = usage.prompt_token_count,
                candidate_tokens = usage.candidates_token_count,
                "Gemini usage"
            );
        }

        let content = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| ProviderError::MalformedResponse {
                detail: "response carried no candidates".to_string(),
            })?;

        parse_extraction(&content)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
