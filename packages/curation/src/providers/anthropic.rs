//! Anthropic messages-API extractor.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};
use crate::secrets::SecretString;
use crate::tokens::{estimate_tokens, truncate_to_token_budget};
use crate::traits::Extractor;
use crate::types::ExtractionResult;

use super::parse::parse_extraction;
use super::prompt::{article_token_budget, render_prompt, RESPONSE_TOKEN_CAP, TEMPERATURE};

const TIMEOUT_SECS: u64 = 120;
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicExtractor {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    max_tokens: usize,
    base_url: String,
}

impl AnthropicExtractor {
    pub fn new(api_key: SecretString, model: impl Into<String>, max_tokens: usize) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(TIMEOUT_SECS))
                .build()
                .expect("failed to build HTTP client"),
            api_key,
            model: model.into(),
            max_tokens,
            base_url: "https://api.anthropic.com".to_string(),
        }
    }
}

#[async_trait]
impl Extractor for AnthropicExtractor {
    async fn extract(
        &self,
        article_text: &str,
        source_url: &str,
    ) -> ProviderResult<ExtractionResult> {
        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            max_tokens: u32,
            temperature: f32,
            messages: Vec<Message<'a>>,
        }

        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct Response {
            content: Vec<ContentBlock>,
            #[serde(default)]
            usage: Option<Usage>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            #[serde(default)]
            text: String,
        }

        #[derive(Deserialize)]
        struct Usage {
            input_tokens: u32,
            output_tokens: u32,
        }

        let budget = article_token_budget(self.max_tokens, source_url);
        let truncated = truncate_to_token_budget(article_text, budget);
        let prompt = render_prompt(source_url, truncated);

        info!(
            url = %source_url,
            model = %self.model,
            prompt_tokens_estimate = estimate_tokens(&prompt),
            "calling Anthropic"
        );

        let request = Request {
            model: &self.model,
            max_tokens: RESPONSE_TOKEN_CAP,
            temperature: TEMPERATURE,
            messages: vec![Message {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.api_key.expose())
            .header("anthropic-version", API_VERSION)
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
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Anthropic usage"
            );
        }

        let content = parsed
            .content
            .into_iter()
            .next()
            .map(|block| block.text)
            .ok_or_else(|| ProviderError::MalformedResponse {
                detail: "response carried no content blocks".to_string(),
            })?;

        parse_extraction(&content)
    }

    fn name(&self) -> &'static str {
        "claude"
    }
}
