//! Content-addressed result cache
//!
//! Completed analysis results are cached under a fingerprint of the input so
//! that resubmitting the same diagram returns the stored snapshot without
//! re-running the pipeline. Entries are immutable once inserted; eviction is
//! least-recently-used with a fixed capacity.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::AnalysisResult;

/// Default number of cached results
pub const DEFAULT_CACHE_CAPACITY: usize = 200;

/// Characters of diagram text that participate in the fingerprint
const FINGERPRINT_PREFIX_LEN: usize = 500;

/// Computes the cache key for one piece of extracted content.
///
/// Only the first 500 characters of text are hashed together with the
/// filename, so trailing noise in large exports does not defeat caching.
pub fn fingerprint(text: &str, filename: &str) -> String {
    let prefix: String = text.chars().take(FINGERPRINT_PREFIX_LEN).collect();
    format!("{:x}", md5::compute(format!("{}{}", prefix, filename)))
}

/// Hit/miss counters for one cache instance
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups served from cache (0.0 when unused)
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f32 / total as f32
        }
    }
}

/// Storage boundary for completed analysis results
pub trait ResultCache: Send + Sync {
    /// Returns a snapshot of the cached result for `fingerprint`, if any
    fn get(&self, fingerprint: &str) -> Option<AnalysisResult>;

    /// Stores a completed result under `fingerprint`
    fn set(&self, fingerprint: String, result: AnalysisResult);

    /// Removes one entry; returns whether it existed
    fn evict(&self, fingerprint: &str) -> bool;

    /// Lookup counters, when the implementation tracks them
    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: AnalysisResult,
    created_at: DateTime<Utc>,
}

struct Inner {
    entries: LruCache<String, CacheEntry>,
    hits: u64,
    misses: u64,
}

/// In-memory [`ResultCache`] with LRU eviction
pub struct LruResultCache {
    inner: Mutex<Inner>,
}

impl LruResultCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).expect("cache capacity must be non-zero");
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LruResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl ResultCache for LruResultCache {
    fn get(&self, fingerprint: &str) -> Option<AnalysisResult> {
        if let Ok(mut inner) = self.inner.lock() {
            match inner.entries.get(fingerprint) {
                Some(entry) => {
                    let age_secs = (Utc::now() - entry.created_at).num_seconds();
                    let result = entry.result.clone();
                    debug!(fingerprint, age_secs, "cache hit");
                    inner.hits += 1;
                    Some(result)
                }
                None => {
                    inner.misses += 1;
                    None
                }
            }
        } else {
            warn!("result cache lock poisoned, treating lookup as miss");
            None
        }
    }

    fn set(&self, fingerprint: String, result: AnalysisResult) {
        if let Ok(mut inner) = self.inner.lock() {
            let entry = CacheEntry {
                result,
                created_at: Utc::now(),
            };
            inner.entries.put(fingerprint, entry);
        }
    }

    fn evict(&self, fingerprint: &str) -> bool {
        if let Ok(mut inner) = self.inner.lock() {
            inner.entries.pop(fingerprint).is_some()
        } else {
            false
        }
    }

    fn stats(&self) -> CacheStats {
        self.inner
            .lock()
            .map(|inner| CacheStats {
                hits: inner.hits,
                misses: inner.misses,
            })
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for LruResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("LruResultCache")
            .field("len", &self.len())
            .field("hits", &stats.hits)
            .field("misses", &stats.misses)
            .finish()
    }
}
