//! Web search collaborator.
//!
//! Search failures are absorbed at this seam: implementations return an
//! empty URL list and log a diagnostic rather than erroring, so a flaky
//! search API can never abort a batch.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::secrets::SecretString;

/// The search API never returns more than ten results per request.
pub const MAX_SEARCH_RESULTS: usize = 10;

/// Query string → ordered URL list.
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Search the web for up to `max_results` article URLs.
    ///
    /// Errors surface as an empty list plus a logged diagnostic, never as
    /// a return error.
    async fn search(&self, query: &str, max_results: usize) -> Vec<String>;
}

/// Google Custom Search implementation.
pub struct GoogleSearcher {
    client: reqwest::Client,
    api_key: SecretString,
    engine_id: String,
}

impl GoogleSearcher {
    pub fn new(api_key: SecretString, engine_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
            api_key,
            engine_id: engine_id.into(),
        }
    }
}

#[async_trait]
impl WebSearcher for GoogleSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Vec<String> {
        #[derive(Deserialize)]
        struct Response {
            #[serde(default)]
            items: Vec<Item>,
        }

        #[derive(Deserialize)]
        struct Item {
            link: String,
        }

        info!(query = %query, max_results, "searching");

        let num = max_results.min(MAX_SEARCH_RESULTS).to_string();
        let request = self
            .client
            .get("https://www.googleapis.com/customsearch/v1")
            .query(&[
                ("key", self.api_key.expose()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await;

        let response = match request {
            Ok(r) => r,
            Err(err) => {
                warn!(query = %query, error = %err, "search request failed");
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(
                query = %query,
                status = %status,
                detail = %body.chars().take(500).collect::<String>(),
                "search returned error status"
            );
            return Vec::new();
        }

        match response.json::<Response>().await {
            Ok(parsed) => {
                let urls: Vec<String> = parsed.items.into_iter().map(|i| i.link).collect();
                info!(query = %query, found = urls.len(), "search complete");
                urls
            }
            Err(err) => {
                warn!(query = %query, error = %err, "search response not decodable");
                Vec::new()
            }
        }
    }
}
