//! In-process TTL cache of rendered proforma HTML.
//!
//! Entries are keyed by `"{order_id}_{shop}"` and evicted lazily: an
//! expired entry is removed by the read that finds it. Nothing is evicted
//! proactively. Concurrent misses for one key may both render; the last
//! insert wins.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use proforma_core::{OrderId, ShopDomain};

/// Source of the current time.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let by = TimeDelta::from_std(by).unwrap_or(TimeDelta::MAX);
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = now.checked_add_signed(by).unwrap_or(DateTime::<Utc>::MAX_UTC);
    }

    /// Set the clock to an instant.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    html: String,
    created_at: DateTime<Utc>,
}

/// Rendered documents by order and shop.
pub struct RenderCache {
    entries: DashMap<String, CacheEntry>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for RenderCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCache")
            .field("entries", &self.entries.len())
            .field("ttl", &self.ttl)
            .field("clock", &self.clock)
            .finish()
    }
}

impl RenderCache {
    /// Cache on the wall clock.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }

    /// Cache key of a document.
    #[must_use]
    pub fn key(order_id: OrderId, shop: &ShopDomain) -> String {
        format!("{order_id}_{shop}")
    }

    /// Cached HTML, if present and not older than the TTL.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();

        // Read into an owned value before touching the map again: removing
        // while a shard guard is held deadlocks.
        let (html, expired) = {
            let entry = self.entries.get(key)?;
            (entry.html.clone(), self.is_expired(&entry, now))
        };

        if expired {
            self.entries
                .remove_if(key, |_, entry| self.is_expired(entry, now));
            return None;
        }

        Some(html)
    }

    /// Store HTML, replacing any previous entry for the key.
    pub fn insert(&self, key: String, html: String) {
        self.entries.insert(
            key,
            CacheEntry {
                html,
                created_at: self.clock.now(),
            },
        );
    }

    /// Number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.created_at) > self.ttl
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn cache(ttl_secs: u64) -> (RenderCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        ));
        let cache = RenderCache::with_clock(Duration::from_secs(ttl_secs), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_key_format() {
        let shop = ShopDomain::parse("negozio.myshopify.com").unwrap();
        assert_eq!(
            RenderCache::key(OrderId::new(1001), &shop),
            "1001_negozio.myshopify.com"
        );
    }

    #[test]
    fn test_hit_within_ttl() {
        let (cache, clock) = cache(300);
        cache.insert("k".to_string(), "<html>".to_string());

        clock.advance(Duration::from_secs(300));
        assert_eq!(cache.get("k").as_deref(), Some("<html>"));
    }

    #[test]
    fn test_expired_entry_is_evicted_on_read() {
        let (cache, clock) = cache(300);
        cache.insert("k".to_string(), "<html>".to_string());

        clock.advance(Duration::from_secs(301));
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_overwrites_and_restarts_ttl() {
        let (cache, clock) = cache(300);
        cache.insert("k".to_string(), "old".to_string());

        clock.advance(Duration::from_secs(200));
        cache.insert("k".to_string(), "new".to_string());

        clock.advance(Duration::from_secs(200));
        assert_eq!(cache.get("k").as_deref(), Some("new"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_miss() {
        let (cache, _) = cache(300);
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_manual_clock_set() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(Duration::from_secs(60));
        assert_eq!(clock.now(), start + TimeDelta::seconds(60));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
