//! Per-URL cache for enhancement results.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use {skein_common::EnhancedAction, tracing::debug};

struct CacheEntry {
    enhanced: Vec<EnhancedAction>,
    stored_at: Instant,
}

/// Time-bounded cache keyed by page URL. An entry is served while strictly
/// younger than the TTL and replaced wholesale on the next store; there is no
/// partial merging of old and new suggestion runs.
pub struct EnhancementCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl EnhancementCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: HashMap::new() }
    }

    #[must_use]
    pub fn get(&self, url: &str) -> Option<Vec<EnhancedAction>> {
        self.get_at(url, Instant::now())
    }

    fn get_at(&self, url: &str, now: Instant) -> Option<Vec<EnhancedAction>> {
        let entry = self.entries.get(url)?;
        if now.duration_since(entry.stored_at) >= self.ttl {
            debug!(url, "cache entry expired");
            return None;
        }
        Some(entry.enhanced.clone())
    }

    pub fn put(&mut self, url: impl Into<String>, enhanced: Vec<EnhancedAction>) {
        self.entries
            .insert(url.into(), CacheEntry { enhanced, stored_at: Instant::now() });
    }

    /// Drop expired entries. Called opportunistically on store.
    pub fn evict_expired(&mut self) {
        let now = Instant::now();
        self.entries
            .retain(|_, entry| now.duration_since(entry.stored_at) < self.ttl);
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        skein_common::{ActionKind, EnhancedAction, SerializedAction},
    };

    fn enhanced() -> Vec<EnhancedAction> {
        vec![EnhancedAction::from(SerializedAction {
            id: "action-0".into(),
            label: "Save".into(),
            raw_label: "Save".into(),
            kind: ActionKind::Button,
            target_href: None,
            locator: "#save".into(),
            bounds: None,
        })]
    }

    fn backdate(cache: &mut EnhancementCache, url: &str, age: Duration) {
        let entry = cache.entries.get_mut(url).unwrap();
        entry.stored_at = entry.stored_at.checked_sub(age).unwrap();
    }

    #[test]
    fn serves_fresh_entries() {
        let mut cache = EnhancementCache::new(Duration::from_secs(300));
        cache.put("https://example.com/", enhanced());
        backdate(&mut cache, "https://example.com/", Duration::from_secs(299));
        assert!(cache.get("https://example.com/").is_some());
    }

    #[test]
    fn expires_entries_at_ttl() {
        let mut cache = EnhancementCache::new(Duration::from_secs(300));
        cache.put("https://example.com/", enhanced());
        backdate(&mut cache, "https://example.com/", Duration::from_secs(301));
        assert!(cache.get("https://example.com/").is_none());
    }

    #[test]
    fn misses_unknown_urls() {
        let cache = EnhancementCache::new(Duration::from_secs(300));
        assert!(cache.get("https://example.com/other").is_none());
    }

    #[test]
    fn put_replaces_wholesale() {
        let mut cache = EnhancementCache::new(Duration::from_secs(300));
        cache.put("https://example.com/", enhanced());
        cache.put("https://example.com/", Vec::new());
        assert_eq!(cache.get("https://example.com/").unwrap().len(), 0);
    }

    #[test]
    fn evict_expired_drops_stale_entries() {
        let mut cache = EnhancementCache::new(Duration::from_secs(300));
        cache.put("https://a/", enhanced());
        cache.put("https://b/", enhanced());
        backdate(&mut cache, "https://a/", Duration::from_secs(400));
        cache.evict_expired();
        assert!(cache.entries.contains_key("https://b/"));
        assert!(!cache.entries.contains_key("https://a/"));
    }
}
