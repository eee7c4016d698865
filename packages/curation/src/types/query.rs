//! Search query types.

use serde::{Deserialize, Serialize};

/// What a query is trying to surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryCategory {
    /// General review coverage (keyword and site-restricted searches).
    Review,
    /// Brand official-site material.
    Official,
    /// Searches pinned to a specific shoe model.
    ModelSpecific,
    /// Searches pinned to a usage category (daily, racing, trail).
    UsageSpecific,
}

/// Query priority. Determines how many search results are consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Resolve the result-count ceiling for this priority.
    ///
    /// `base` is the configured per-query result count: high-priority
    /// queries use it as-is, medium queries take half (never fewer than
    /// three), low queries take three.
    pub fn result_ceiling(self, base: usize) -> usize {
        match self {
            Priority::High => base,
            Priority::Medium => (base / 2).max(3),
            Priority::Low => 3,
        }
    }
}

/// One planned search, generated once per run by the planner.
///
/// Queries are not required to be unique within a batch; the orchestrator
/// collapses duplicate result URLs through the cache instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The literal search string handed to the search collaborator.
    pub text: String,

    pub category: QueryCategory,

    pub priority: Priority,

    /// Brand the planner generated this query for, when known.
    /// Override queries supplied by the operator carry `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl SearchQuery {
    /// Create a planner-independent query (used for operator overrides).
    pub fn ad_hoc(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: QueryCategory::Review,
            priority: Priority::Medium,
            brand: None,
        }
    }
}
