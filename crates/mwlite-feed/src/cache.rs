//! Time-boxed cache of live price points.
//!
//! Injected into the fetcher; expiry is a constructor parameter. Only live
//! points are stored, so mock values are never replayed as real ones.

use std::time::Duration;

use dashmap::DashMap;
use mwlite_core::{Category, Period, PricePoint, SymbolRequest};
use tokio::time::Instant;

/// Cache key: category, uppercase symbol, period.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    category: Category,
    symbol: String,
    period: Period,
}

impl CacheKey {
    pub fn new(request: &SymbolRequest, period: Period) -> Self {
        Self {
            category: request.category(),
            symbol: request.identifier().trim().to_ascii_uppercase(),
            period,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    point: PricePoint,
    stored_at: Instant,
}

/// Concurrent response cache.
pub struct ResponseCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
}

impl ResponseCache {
    /// Create a cache whose entries expire after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a fresh entry. Expired entries are removed on access.
    pub fn get(&self, request: &SymbolRequest, period: Period) -> Option<PricePoint> {
        let key = CacheKey::new(request, period);
        {
            let entry = self.entries.get(&key)?;
            if entry.stored_at.elapsed() < self.ttl {
                return Some(entry.point.clone());
            }
        }
        self.evict_if_expired(&key);
        None
    }

    /// Remove `key` only if the entry is still expired. The check runs
    /// under the shard lock, so an entry replaced by a concurrent insert
    /// survives.
    fn evict_if_expired(&self, key: &CacheKey) {
        self.entries
            .remove_if(key, |_, entry| entry.stored_at.elapsed() >= self.ttl);
    }

    pub fn insert(&self, request: &SymbolRequest, period: Period, point: PricePoint) {
        self.entries.insert(
            CacheKey::new(request, period),
            CacheEntry {
                point,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every expired entry. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        before.saturating_sub(self.entries.len())
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
