//! Structured extraction collaborator.

use async_trait::async_trait;

use crate::error::ProviderResult;
use crate::types::ExtractionResult;

/// Article text → structured review payload.
///
/// Implementations wrap one language-model service each and own the full
/// round trip: token budgeting, prompt rendering, the HTTP call, and
/// parsing the response into an [`ExtractionResult`]. Callers guarantee
/// `article_text` has already passed the minimum-length gate.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(
        &self,
        article_text: &str,
        source_url: &str,
    ) -> ProviderResult<ExtractionResult>;

    /// Short provider name for logging.
    fn name(&self) -> &'static str;
}
