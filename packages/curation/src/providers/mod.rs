//! Extraction provider implementations.
//!
//! One type per backing service, all behind the [`Extractor`] trait.
//! Selection happens once, at construction time, via [`build_extractor`];
//! there is no per-call dispatch on provider names.

pub mod anthropic;
pub mod dify;
pub mod gemini;
pub mod openai;
pub mod parse;
pub mod prompt;

use std::sync::Arc;

use crate::config::{PipelineConfig, ProviderSettings};
use crate::traits::Extractor;

pub use anthropic::AnthropicExtractor;
pub use dify::DifyExtractor;
pub use gemini::GeminiExtractor;
pub use openai::OpenAiExtractor;

/// Build the configured extractor.
///
/// Credentials were validated when the configuration was constructed, so
/// this cannot fail; it only wires the chosen variant.
pub fn build_extractor(config: &PipelineConfig) -> Arc<dyn Extractor> {
    match &config.provider {
        ProviderSettings::OpenAi { api_key, model } => Arc::new(OpenAiExtractor::new(
            api_key.clone(),
            model.clone(),
            config.max_tokens,
        )),
        ProviderSettings::Anthropic { api_key, model } => Arc::new(AnthropicExtractor::new(
            api_key.clone(),
            model.clone(),
            config.max_tokens,
        )),
        ProviderSettings::Gemini { api_key, model } => Arc::new(GeminiExtractor::new(
            api_key.clone(),
            model.clone(),
            config.max_tokens,
        )),
        ProviderSettings::Dify {
            api_key,
            base_url,
            workflow_id,
        } => Arc::new(DifyExtractor::new(
            api_key.clone(),
            base_url.clone(),
            workflow_id.clone(),
            config.max_text_length,
            config.max_tokens,
        )),
    }
}
