//! TTL cache for assistant answers.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct CachedEntry {
    answer: String,
    stamped: Instant,
}

/// In-memory cache keyed by a digest of the normalized query and context.
///
/// The key is the blake3 hex digest of `"{query}|{context}"` lowercased and
/// trimmed, so lookups are insensitive to case and outer whitespace.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CachedEntry>>,
    ttl: Duration,
}

impl ResponseCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the cached answer when present and unexpired. Expired entries
    /// are evicted on access.
    #[must_use]
    pub fn get(&self, query: &str, context: &str) -> Option<String> {
        let key = cache_key(query, context);
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match entries.get(&key) {
            Some(entry) if entry.stamped.elapsed() < self.ttl => Some(entry.answer.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, query: &str, context: &str, answer: String) {
        let key = cache_key(query, context);
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(
            key,
            CachedEntry {
                answer,
                stamped: Instant::now(),
            },
        );
    }
}

fn cache_key(query: &str, context: &str) -> String {
    let combined = format!("{query}|{context}").to_lowercase();
    let mut hasher = blake3::Hasher::new();
    hasher.update(combined.trim().as_bytes());
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_returns_answer() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("What is Rust?", "", "A systems language.".into());
        assert_eq!(
            cache.get("What is Rust?", "").as_deref(),
            Some("A systems language.")
        );
    }

    #[test]
    fn key_is_case_and_whitespace_insensitive() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("  What is Rust?", "", "answer".into());
        assert!(cache.get("what is rust?", "").is_some());
    }

    #[test]
    fn different_context_is_a_miss() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("question", "chapter one", "answer".into());
        assert!(cache.get("question", "chapter two").is_none());
    }

    #[test]
    fn expired_entry_is_evicted() {
        let cache = ResponseCache::new(Duration::ZERO);
        cache.insert("question", "", "answer".into());
        assert!(cache.get("question", "").is_none());
        assert!(cache.get("question", "").is_none());
    }

    #[test]
    fn cache_key_is_stable_hex() {
        let key = cache_key("q", "c");
        assert_eq!(key.len(), 64);
        assert_eq!(key, cache_key("q", "c"));
        assert_ne!(key, cache_key("q", "d"));
    }
}
