//! OpenAI chat-completion extractor.

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

pub struct OpenAiExtractor {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    max_tokens: usize,
    base_url: String,
}

impl OpenAiExtractor {
    pub fn new(api_key: SecretString, model: impl Into<String>, max_tokens: usize) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(TIMEOUT_SECS))
                .build()
                .expect("failed to build HTTP client"),
            api_key,
            model: model.into(),
            max_tokens,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Point at a compatible endpoint (Azure, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl Extractor for OpenAiExtractor {
    async fn extract(
        &self,
        article_text: &str,
        source_url: &str,
    ) -> ProviderResult<ExtractionResult> {
        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            messages: Vec<Message<'a>>,
            temperature: f32,
            max_tokens: u32,
            response_format: ResponseFormat,
        }

        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct ResponseFormat {
            #[serde(rename = "type")]
            format_type: &'static str,
        }

        #[derive(Deserialize)]
        struct Response {
            choices: Vec<Choice>,
            #[serde(default)]
            usage: Option<Usage>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ResponseMessage,
        }

        #[derive(Deserialize)]
        struct ResponseMessage {
            content: String,
        }

        #[derive(Deserialize)]
        struct Usage {
            prompt_tokens: u32,
            completion_tokens: u32,
        }

        let budget = article_token_budget(self.max_tokens, source_url);
        let truncated = truncate_to_token_budget(article_text, budget);
        if truncated.len() < article_text.len() {
            debug!(
                url = %source_url,
                budget,
                original_chars = article_text.chars().count(),
                truncated_chars = truncated.chars().count(),
                "article truncated to token budget"
            );
        }
        let prompt = render_prompt(source_url, truncated);

        info!(
            url = %source_url,
            model = %self.model,
            prompt_tokens_estimate = estimate_tokens(&prompt),
            "calling OpenAI"
        );

        let request = Request {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: RESPONSE_TOKEN_CAP,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
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

        if let Some(usage) = &parsed.usage {
            debug!(
                url = %source_url,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "OpenAI usage"
            );
        }

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::MalformedResponse {
                detail: "response carried no choices".to_string(),
            })?;

        parse_extraction(&content)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
