//! Running-shoe review curation pipeline.
//!
//! Collects web articles about running shoes, converts each article into a
//! structured record through a language-model extraction step, and
//! consolidates the per-article records into one canonical record per
//! shoe.
//!
//! # Pipeline
//!
//! ```text
//! planner ─▶ orchestrator ─▶ [ArticleRecord] ─▶ aggregate ─▶ CSV/JSON
//!               │  ▲
//!               ▼  │ (authoritative hits)
//!             UrlCache
//! ```
//!
//! The orchestrator consults the durable [`cache::UrlCache`] before any
//! network call, fetches article text through the
//! [`traits::ArticleFetcher`] seam, and hands it to the configured
//! [`traits::Extractor`] under a token budget ([`tokens`]). Upstream
//! services are assumed unreliable: search errors become empty result
//! lists, provider failures skip the URL, and a damaged cache store
//! degrades to an empty cache. No single URL or query can abort a run.
//!
//! # Usage
//!
//! ```rust,ignore
//! use curation::{
//!     cache::UrlCache, config::PipelineConfig, orchestrator::FetchOrchestrator,
//!     pipeline::PipelineDriver, providers, throttle::RequestPacer,
//!     traits::{GoogleSearcher, HttpArticleFetcher},
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! let config = PipelineConfig::from_env()?;
//! let orchestrator = FetchOrchestrator::new(
//!     Arc::new(GoogleSearcher::new(config.google_api_key.clone(), &config.google_engine_id)),
//!     Arc::new(HttpArticleFetcher::new()),
//!     providers::build_extractor(&config),
//!     RequestPacer::new(config.requests_per_second),
//!     config.results_per_query,
//! );
//! let cache = UrlCache::load(&config.cache_path);
//! let driver = PipelineDriver::new(orchestrator, cache, &config, CancellationToken::new());
//! let (summary, products) = driver.run().await;
//! ```

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod pipeline;
pub mod planner;
pub mod providers;
pub mod secrets;
pub mod testing;
pub mod throttle;
pub mod tokens;
pub mod traits;
pub mod types;

pub use aggregate::aggregate;
pub use cache::{CacheEntry, UrlCache};
pub use config::{PipelineConfig, ProviderSettings};
pub use error::{CacheError, ConfigError, CurationError, ProviderError, Result};
pub use orchestrator::{FetchOrchestrator, QueryReport};
pub use pipeline::{PipelineDriver, RunSummary};
pub use planner::{plan_all_queries, plan_brand_queries};
pub use providers::build_extractor;
pub use secrets::SecretString;
pub use throttle::RequestPacer;
pub use tokens::{estimate_tokens, truncate_to_token_budget};
pub use traits::{ArticleFetcher, Extractor, GoogleSearcher, HttpArticleFetcher, WebSearcher};
pub use types::{
    ArticleRecord, CanonicalProductRecord, ExtractionResult, Priority, QueryCategory, SearchQuery,
};
