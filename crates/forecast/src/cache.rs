//! In-memory response cache keyed by requesting device.
//!
//! One `ResponseCache` instance exists per data kind (tide, UV). Entries
//! are immutable once inserted; a refresh appends a new entry and pruning
//! removes the old one, there is no update-in-place. Pruning is lazy — it
//! runs on every `store`, never from a background timer.
//!
//! The facade serializes all mutation behind a mutex, but the
//! lookup-miss → upstream fetch → store sequence is not atomic: two
//! concurrent misses for the same device may both fetch. That costs one
//! duplicate upstream call and nothing else, so it is tolerated.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::debug;

/// A cached upstream response. Never mutated after insertion.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Raw JSON body as returned by the upstream API.
    pub payload: Value,
    pub fetched_at: DateTime<Utc>,
    /// Device the response was fetched for.
    pub owner: String,
}

/// Bounded, TTL-expiring list of cached responses.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Vec<CacheEntry>,
    ttl: Duration,
    max_records: usize,
}

impl ResponseCache {
    pub fn new(ttl_hours: i64, max_records: usize) -> Self {
        Self {
            entries: Vec::new(),
            ttl: Duration::hours(ttl_hours),
            max_records,
        }
    }

    /// Freshest non-expired payload for the device, if any.
    ///
    /// Read-only: expired entries are skipped here and reaped by the next
    /// `store`.
    pub fn lookup(&self, owner: &str) -> Option<&Value> {
        self.lookup_at(owner, Utc::now())
    }

    pub fn lookup_at(&self, owner: &str, now: DateTime<Utc>) -> Option<&Value> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.owner == owner && now - e.fetched_at < self.ttl)
            .map(|e| &e.payload)
    }

    /// Append a fresh response, then prune: oldest-first down to
    /// `max_records`, and everything older than the TTL regardless of owner.
    pub fn store(&mut self, payload: Value, owner: &str) {
        self.store_at(payload, owner, Utc::now());
    }

    pub fn store_at(&mut self, payload: Value, owner: &str, now: DateTime<Utc>) {
        self.entries.push(CacheEntry {
            payload,
            fetched_at: now,
            owner: owner.to_string(),
        });

        if self.entries.len() > self.max_records {
            let excess = self.entries.len() - self.max_records;
            self.entries.drain(..excess);
        }

        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|e| now - e.fetched_at < ttl);
        if self.entries.len() < before {
            debug!(
                "Pruned {} expired cache entries ({} remain)",
                before - self.entries.len(),
                self.entries.len()
            );
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cache() -> ResponseCache {
        ResponseCache::new(8, 150)
    }

    #[test]
    fn test_lookup_after_store_returns_payload() {
        let mut c = cache();
        let now = Utc::now();
        c.store_at(json!({"n": 1}), "device-a", now);

        assert_eq!(c.lookup_at("device-a", now), Some(&json!({"n": 1})));
        assert_eq!(c.lookup_at("device-b", now), None);
    }

    #[test]
    fn test_lookup_skips_expired_entries() {
        let mut c = cache();
        let t0 = Utc::now();
        c.store_at(json!({"n": 1}), "device-a", t0);

        // One second short of the TTL: still live.
        let almost = t0 + Duration::hours(8) - Duration::seconds(1);
        assert!(c.lookup_at("device-a", almost).is_some());

        // Exactly at the TTL: evictable, treated as absent.
        let expired = t0 + Duration::hours(8);
        assert_eq!(c.lookup_at("device-a", expired), None);
    }

    #[test]
    fn test_lookup_prefers_freshest_entry() {
        let mut c = cache();
        let t0 = Utc::now();
        c.store_at(json!({"n": 1}), "device-a", t0);
        c.store_at(json!({"n": 2}), "device-a", t0 + Duration::minutes(5));

        assert_eq!(
            c.lookup_at("device-a", t0 + Duration::minutes(6)),
            Some(&json!({"n": 2}))
        );
    }

    #[test]
    fn test_store_trims_oldest_beyond_max_records() {
        let mut c = ResponseCache::new(8, 3);
        let now = Utc::now();
        for i in 0..5 {
            c.store_at(json!({"n": i}), &format!("device-{}", i), now);
            assert!(c.len() <= 3, "cache must never exceed max_records");
        }

        // Oldest two were trimmed.
        assert_eq!(c.lookup_at("device-0", now), None);
        assert_eq!(c.lookup_at("device-1", now), None);
        assert_eq!(c.lookup_at("device-4", now), Some(&json!({"n": 4})));
    }

    #[test]
    fn test_store_reaps_expired_entries_for_all_owners() {
        let mut c = cache();
        let t0 = Utc::now();
        c.store_at(json!({"n": 1}), "device-a", t0);
        c.store_at(json!({"n": 2}), "device-b", t0);

        // A store nine hours later reaps both stale entries.
        let later = t0 + Duration::hours(9);
        c.store_at(json!({"n": 3}), "device-c", later);

        assert_eq!(c.len(), 1);
        assert_eq!(c.lookup_at("device-c", later), Some(&json!({"n": 3})));
    }

    #[test]
    fn test_refresh_is_insert_then_prune_not_update() {
        let mut c = cache();
        let t0 = Utc::now();
        c.store_at(json!({"n": 1}), "device-a", t0);
        c.store_at(json!({"n": 2}), "device-a", t0 + Duration::minutes(1));

        // Stale duplicate coexists until TTL pruning catches it.
        assert_eq!(c.len(), 2);
    }
}
