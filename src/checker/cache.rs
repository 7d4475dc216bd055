// src/checker/cache.rs
// =============================================================================
// Time-bounded memoization of remote probe results.
//
// Keyed by everything that decides a probe's outcome: (uri, method, retry
// budget). One cache belongs to one profile, so settings that change the
// answer (user agent, timeouts) never share entries.
//
// Dead results are cached too. Hammering a known-dead URL once per
// occurrence in a document is exactly what the cache exists to stop.
//
// Two tasks that miss on the same key at the same time will both probe;
// whichever finishes last writes the entry. Entries are replaced, never
// mutated, so readers only ever see a whole result.
// =============================================================================

use super::http::RemoteProber;
use super::probe::{Method, ProbeResult};
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

const FOREVER: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub uri: String,
    pub method: Method,
    pub max_retries: u32,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: ProbeResult,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct ResultCache {
    ttl: Duration,
    entries: DashMap<CacheKey, CacheEntry>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    // Returns a live entry. An expired one is dropped on the way out and
    // reported as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<ProbeResult> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if now < entry.expires_at {
                return Some(entry.result.clone());
            }
        }
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        None
    }

    pub fn insert(&self, key: CacheKey, result: ProbeResult) {
        let now = Instant::now();
        // An absurd TTL just means "never expires" for this process
        let expires_at = now.checked_add(self.ttl).unwrap_or(now + FOREVER);
        let entry = CacheEntry { result, expires_at };
        self.entries.insert(key, entry);
    }

    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// A RemoteProber behind a ResultCache.
pub struct CachedProber {
    prober: RemoteProber,
    cache: ResultCache,
}

impl CachedProber {
    pub fn new(prober: RemoteProber, ttl: Duration) -> Self {
        Self {
            prober,
            cache: ResultCache::new(ttl),
        }
    }

    pub async fn probe(&self, uri: &str, method: Method, max_retries: u32) -> ProbeResult {
        let key = CacheKey {
            uri: uri.to_string(),
            method,
            max_retries,
        };

        if let Some(hit) = self.cache.get(&key) {
            debug!(uri, %method, "cache hit");
            return hit;
        }

        debug!(uri, %method, "cache miss");
        let result = self.prober.probe(uri, method, max_retries).await;
        self.cache.insert(key, result.clone());
        result
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }
}
