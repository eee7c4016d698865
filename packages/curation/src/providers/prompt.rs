//! The fixed extraction prompt shared by every provider variant.

use crate::tokens::estimate_tokens;

/// Tokens held back for the model's response when budgeting the input.
pub const RESERVED_RESPONSE_TOKENS: usize = 500;

/// Cap on response tokens requested from the provider.
pub const RESPONSE_TOKEN_CAP: u32 = 1000;

/// Low temperature keeps the JSON shape stable across calls.
pub const TEMPERATURE: f32 = 0.3;

/// System-role framing for providers that support a system message.
pub const SYSTEM_PROMPT: &str =
    "You are a running shoe expert. Extract information accurately in JSON format.";

const REVIEW_PROMPT: &str = r#"You are a running shoe expert. Analyze the following article and extract structured information as JSON.

Article URL: {url}

Article content:
{article_text}

Respond with exactly this JSON shape:
{
  "product_info": {
    "brand_name": "brand (e.g. Nike, Adidas, ASICS)",
    "model_name": "model (e.g. Pegasus 41, Ultraboost 23)",
    "category": "category (e.g. Daily Trainer, Racing, Trail)",
    "release_year": release year as a number, or null if unknown,
    "price_usd": price in USD, or null if unknown
  },
  "specs": {
    "weight_g": weight in grams, or null,
    "drop_mm": heel-to-toe drop in mm, or null,
    "stack_height_heel_mm": heel stack height in mm, or null,
    "stack_height_forefoot_mm": forefoot stack height in mm, or null
  },
  "review_content": {
    "summary": "a roughly 200-character summary of the article",
    "pros": ["pro 1", "pro 2", "pro 3"],
    "cons": ["con 1", "con 2"]
  },
  "analysis": {
    "sentiment_score": sentiment from 0 to 100,
    "recommended_runner_level": "e.g. Beginner, Intermediate, Advanced, All",
    "best_for": "e.g. daily training, long runs, racing"
  }
}

Output only the JSON object, with no surrounding explanation."#;

/// Render the extraction prompt for one article.
///
/// Plain placeholder substitution; the template's JSON braces make
/// `format!` impractical.
pub fn render_prompt(source_url: &str, article_text: &str) -> String {
    REVIEW_PROMPT
        .replace("{url}", source_url)
        .replace("{article_text}", article_text)
}

/// Estimated token cost of the prompt with an empty article body.
///
/// Providers subtract this (plus [`RESERVED_RESPONSE_TOKENS`]) from their
/// overall budget to find how much article text fits.
pub fn prompt_overhead_tokens(source_url: &str) -> usize {
    estimate_tokens(&render_prompt(source_url, ""))
}

/// Token budget left for article text under `max_tokens`.
pub fn article_token_budget(max_tokens: usize, source_url: &str) -> usize {
    max_tokens.saturating_sub(prompt_overhead_tokens(source_url) + RESERVED_RESPONSE_TOKENS)
}
