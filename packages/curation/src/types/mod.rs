//! Data model for the curation pipeline.

pub mod product;
pub mod query;
pub mod record;

pub use product::CanonicalProductRecord;
pub use query::{Priority, QueryCategory, SearchQuery};
pub use record::{
    ArticleRecord, ExtractionResult, ProductInfo, ReviewAnalysis, ReviewContent, ShoeSpecs,
};
