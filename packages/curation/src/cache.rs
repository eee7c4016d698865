//! Durable URL cache.
//!
//! Maps each processed URL to its extraction result so repeat runs never
//! pay for the same fetch or provider call twice. The store is a single
//! JSON object keyed by URL; entries are never evicted (unbounded growth
//! is an accepted trade-off), and a hit is authoritative for the lifetime
//! of the entry.
//!
//! Failure semantics are deliberately soft: an unreadable or corrupt store
//! degrades to an empty cache with a warning, and a failed persist loses
//! only the current run's new entries.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::CacheError;
use crate::types::ExtractionResult;

/// One cached extraction. Unknown keys in the stored JSON are ignored on
/// read, keeping old stores loadable across schema additions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub analysis: ExtractionResult,
    pub cached_at: DateTime<Utc>,
}

/// Persistent URL → extraction map.
#[derive(Debug)]
pub struct UrlCache {
    path: PathBuf,
    entries: HashMap<String, CacheEntry>,
}

impl UrlCache {
    /// Load the cache from `path`.
    ///
    /// A missing store yields an empty cache; a corrupt or unreadable one
    /// does too, with a warning, so a damaged file never blocks a run.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read_store(&path) {
            Ok(Some(entries)) => {
                info!(path = %path.display(), urls = entries.len(), "loaded URL cache");
                entries
            }
            Ok(None) => HashMap::new(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cache unreadable, starting empty");
                HashMap::new()
            }
        };
        Self { path, entries }
    }

    /// Create an empty cache that persists to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: HashMap::new(),
        }
    }

    fn read_store(path: &Path) -> Result<Option<HashMap<String, CacheEntry>>, CacheError> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn get(&self, url: &str) -> Option<&CacheEntry> {
        self.entries.get(url)
    }

    /// Insert or overwrite the entry for `url`, stamped now.
    pub fn put(&mut self, url: impl Into<String>, analysis: ExtractionResult) {
        self.entries.insert(
            url.into(),
            CacheEntry {
                analysis,
                cached_at: Utc::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the whole map to the store.
    ///
    /// The write goes through a sibling temp file and a rename, so the
    /// store is never left half-written. Failures are logged and swallowed.
    pub fn persist(&self) {
        if let Err(err) = self.try_persist() {
            warn!(
                path = %self.path.display(),
                error = %err,
                "cache persist failed, new entries from this run may be lost"
            );
        } else {
            debug!(path = %self.path.display(), urls = self.entries.len(), "persisted URL cache");
        }
    }

    fn try_persist(&self) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result(brand: &str) -> ExtractionResult {
        let mut result = ExtractionResult::default();
        result.product_info.brand_name = Some(brand.to_string());
        result
    }

    #[test]
    fn missing_store_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = UrlCache::load(dir.path().join("url_cache.json"));
        assert!(cache.is_empty());
    }

    #[test]
    fn corrupt_store_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("url_cache.json");
        fs::write(&path, "{ not json").unwrap();
        let cache = UrlCache::load(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn round_trips_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("url_cache.json");

        let mut cache = UrlCache::load(&path);
        cache.put("https://example.com/review", sample_result("Brooks"));
        cache.persist();

        let reloaded = UrlCache::load(&path);
        assert_eq!(reloaded.len(), 1);
        let entry = reloaded.get("https://example.com/review").unwrap();
        assert_eq!(
            entry.analysis.product_info.brand_name.as_deref(),
            Some("Brooks")
        );
    }

    #[test]
    fn put_overwrites_existing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = UrlCache::empty(dir.path().join("url_cache.json"));
        cache.put("https://a.com", sample_result("Nike"));
        cache.put("https://a.com", sample_result("Hoka"));
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache
                .get("https://a.com")
                .unwrap()
                .analysis
                .product_info
                .brand_name
                .as_deref(),
            Some("Hoka")
        );
    }

    #[test]
    fn unknown_keys_in_store_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("url_cache.json");
        fs::write(
            &path,
            r#"{"https://a.com": {"analysis": {}, "cached_at": "2025-11-02T10:00:00Z", "schema_rev": 7}}"#,
        )
        .unwrap();
        let cache = UrlCache::load(&path);
        assert!(cache.contains("https://a.com"));
    }
}
