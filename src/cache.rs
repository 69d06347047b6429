//! Normalization caching with LRU eviction.
//!
//! Catalogs are re-searched on every keystroke, so each distinct raw
//! string is normalized once and its derived forms shared from here. The
//! cache is purely an optimization: eviction or clearing never changes
//! observable output, only speed.

use crate::normalize::{normalize, spaceless};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Default number of distinct raw strings retained.
const DEFAULT_CAPACITY: usize = 4096;

/// The canonical and whitespace-free forms derived from one raw string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedForm {
    pub canonical: String,
    pub spaceless: String,
}

impl NormalizedForm {
    pub fn derive(raw: &str) -> Self {
        let canonical = normalize(raw);
        let spaceless = spaceless(&canonical);
        Self {
            canonical,
            spaceless,
        }
    }
}

pub struct NormalizationCache {
    cache: Mutex<LruCache<String, Arc<NormalizedForm>>>,
}

impl NormalizationCache {
    pub fn new(capacity: usize) -> Self {
        let cache = LruCache::new(
            NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(DEFAULT_CAPACITY).unwrap()),
        );
        Self {
            cache: Mutex::new(cache),
        }
    }

    /// Look up the derived forms for `raw`, computing and retaining them on
    /// a miss. The upsert is idempotent: a key always maps to the same
    /// value, so a concurrent race at worst duplicates the computation.
    pub fn get_or_derive(&self, raw: &str) -> Arc<NormalizedForm> {
        {
            let mut cache = self.cache.lock().unwrap();
            if let Some(form) = cache.get(raw) {
                return Arc::clone(form);
            }
        }

        let form = Arc::new(NormalizedForm::derive(raw));
        {
            let mut cache = self.cache.lock().unwrap();
            cache.put(raw.to_string(), Arc::clone(&form));
        }
        form
    }

    pub fn clear(&self) {
        self.cache.lock().unwrap().clear();
    }

    pub fn stats(&self) -> (usize, usize) {
        let cache = self.cache.lock().unwrap();
        (cache.len(), cache.cap().get())
    }
}

impl Default for NormalizationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
