//! In-memory result cache with optional LRU bound.
//!
//! Entries never expire; they leave only through [`ResultCache::clear`] or
//! least-recently-used eviction once `capacity` is exceeded (0 = unbounded).

use crate::types::{TranslationRequest, TranslationResult};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Field separator inside the hashed payload
const SEP: u8 = 0x1f;

/// `(source, target, sha256(text + options))`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source_language: String,
    pub target_language: String,
    pub digest: String,
}

impl CacheKey {
    /// Key for a request whose source language is already resolved.
    ///
    /// Besides the text, every request option that changes the output is
    /// hashed, so a formal and an informal request for the same text never
    /// share an entry.
    pub fn for_request(
        source_language: &str,
        request: &TranslationRequest,
        cultural_adaptation: bool,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(request.source_text.as_bytes());
        hasher.update([SEP]);
        hasher.update(request.formality.as_deref().unwrap_or("").as_bytes());
        hasher.update([SEP]);
        hasher.update(request.domain.as_deref().unwrap_or("").as_bytes());
        hasher.update([SEP, cultural_adaptation as u8, request.alternatives as u8]);
        for (term, forced) in &request.glossary {
            hasher.update([SEP]);
            hasher.update(term.as_bytes());
            hasher.update(b"=");
            hasher.update(forced.as_bytes());
        }

        Self {
            source_language: source_language.to_string(),
            target_language: request.target_language.clone(),
            digest: hex::encode(hasher.finalize()),
        }
    }
}

struct Entry {
    result: TranslationResult,
    last_used: u64,
}

struct CacheState {
    entries: HashMap<CacheKey, Entry>,
    capacity: usize,
    tick: u64,
}

impl CacheState {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn evict_to_capacity(&mut self) -> usize {
        if self.capacity == 0 {
            return 0;
        }
        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                    evicted += 1;
                }
                None => break,
            }
        }
        evicted
    }
}

pub struct ResultCache {
    state: Mutex<CacheState>,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                capacity,
                tick: 0,
            }),
        }
    }

    /// Returns a copy of the cached result and marks it recently used.
    pub fn get(&self, key: &CacheKey) -> Option<TranslationResult> {
        let mut state = self.state.lock();
        let tick = state.next_tick();
        state.entries.get_mut(key).map(|entry| {
            entry.last_used = tick;
            entry.result.clone()
        })
    }

    /// Last write wins for the same key.
    pub fn insert(&self, key: CacheKey, result: TranslationResult) {
        let mut state = self.state.lock();
        let last_used = state.next_tick();
        state.entries.insert(key, Entry { result, last_used });
        state.evict_to_capacity();
    }

    /// Drops every entry and returns how many there were.
    pub fn clear(&self) -> usize {
        let mut state = self.state.lock();
        let count = state.entries.len();
        state.entries.clear();
        count
    }

    /// Changes the bound, evicting down to it. Returns the number evicted.
    pub fn set_capacity(&self, capacity: usize) -> usize {
        let mut state = self.state.lock();
        state.capacity = capacity;
        state.evict_to_capacity()
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().capacity
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TranslationMetadata, TranslationQuality};
    use chrono::Utc;

    fn result(text: &str) -> TranslationResult {
        TranslationResult {
            translated_text: text.to_string(),
            confidence: 0.9,
            quality: TranslationQuality {
                fluency: 1.0,
                accuracy: 1.0,
                cultural_appropriate: 1.0,
                formality: 1.0,
                overall: 1.0,
            },
            adaptations: vec![],
            alternatives: vec![],
            warnings: vec![],
            metadata: TranslationMetadata {
                engine: "mock".into(),
                engine_type: "neural".into(),
                source_language: "en".into(),
                target_language: "ml".into(),
                processing_time_ms: 1,
                token_count: 1,
                cost: 0.0,
                cache_hit: false,
                attempts: 1,
                timestamp: Utc::now(),
            },
        }
    }

    fn key(text: &str) -> CacheKey {
        CacheKey::for_request("en", &TranslationRequest::new(text, "en", "ml"), true)
    }

    // ==================== Key Tests ====================

    #[test]
    fn test_key_is_stable_and_hex() {
        let a = key("Hello");
        let b = key("Hello");
        assert_eq!(a, b);
        assert_eq!(a.digest.len(), 64);
        assert!(a.digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_varies_with_options() {
        let plain = TranslationRequest::new("Hello", "en", "ml");
        let formal = plain.clone().with_formality("formal");
        let glossary = plain.clone().with_glossary_term("Hello", "നമസ്കാരം");

        let base = CacheKey::for_request("en", &plain, true);
        assert_ne!(base, CacheKey::for_request("en", &formal, true));
        assert_ne!(base, CacheKey::for_request("en", &glossary, true));
        assert_ne!(base, CacheKey::for_request("en", &plain, false));
        assert_ne!(base, CacheKey::for_request("hi", &plain, true));
        assert_ne!(base, key("Hello "));
    }

    // ==================== Store Tests ====================

    #[test]
    fn test_insert_get_clear() {
        let cache = ResultCache::new(0);
        assert!(cache.get(&key("a")).is_none());

        cache.insert(key("a"), result("A"));
        assert_eq!(cache.get(&key("a")).unwrap().translated_text, "A");
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.clear(), 1);
        assert!(cache.get(&key("a")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_last_write_wins() {
        let cache = ResultCache::new(0);
        cache.insert(key("a"), result("first"));
        cache.insert(key("a"), result("second"));
        assert_eq!(cache.get(&key("a")).unwrap().translated_text, "second");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lru_eviction() {
        let cache = ResultCache::new(2);
        cache.insert(key("a"), result("A"));
        cache.insert(key("b"), result("B"));
        // Touch "a" so "b" becomes least recently used
        cache.get(&key("a"));
        cache.insert(key("c"), result("C"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("a")).is_some());
        assert!(cache.get(&key("b")).is_none());
        assert!(cache.get(&key("c")).is_some());
    }

    #[test]
    fn test_shrinking_capacity_evicts() {
        let cache = ResultCache::new(0);
        for text in ["a", "b", "c", "d"] {
            cache.insert(key(text), result(text));
        }
        assert_eq!(cache.set_capacity(1), 3);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("d")).is_some());
        assert_eq!(cache.capacity(), 1);
    }
}
