//! Per-category bounded part cache with recency-ordered eviction
//!
//! Maps variant index -> pending-or-resolved [`Part`] handle. The recency
//! queue is an `IndexSet` (back = most recently touched, front evicted);
//! map and queue live under one mutex so they can never disagree.
//!
//! Duplicate-request suppression is structural: `resolve` returns the
//! stored handle when one exists, pending or ready, so at most one fetch
//! is ever in flight per index. Failed entries are removed by identity
//! (`remove_if`), never cached.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexSet;
use log::debug;

use crate::entities::part::Part;

/// Cache hit/miss/eviction counters
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    entries: HashMap<usize, Part>,
    /// Back = most recently touched. Same index set as `entries`.
    recency: IndexSet<usize>,
}

/// Bounded cache of part handles for one category
#[derive(Debug)]
pub struct PartStore {
    inner: Mutex<StoreInner>,
    capacity: usize,
    stats: CacheStats,
}

impl PartStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            capacity: capacity.max(1),
            stats: CacheStats::default(),
        }
    }

    /// Return the handle for `index`, creating a pending one on miss.
    ///
    /// The second field is true when a new pending handle was inserted;
    /// the caller then owns dispatching exactly one fetch for it. Either
    /// way the index becomes the most recently touched, and an insertion
    /// may evict the least recently touched entry (never this one).
    pub fn resolve(&self, index: usize) -> (Part, bool) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(part) = inner.entries.get(&index) {
            let part = part.clone();
            inner.recency.shift_remove(&index);
            inner.recency.insert(index);
            self.stats.record_hit();
            return (part, false);
        }

        let part = Part::pending();
        inner.entries.insert(index, part.clone());
        inner.recency.insert(index);
        self.stats.record_miss();

        while inner.entries.len() > self.capacity {
            let Some(oldest) = inner.recency.shift_remove_index(0) else {
                break;
            };
            inner.entries.remove(&oldest);
            self.stats.record_eviction();
            debug!("evicted part [{}] (lru)", oldest);
        }

        (part, true)
    }

    /// Drop the entry for `index` if it still holds this exact handle.
    ///
    /// Used by workers on fetch failure so the next resolve retries; the
    /// identity check keeps a stale failure from evicting a newer entry
    /// created after this one was already replaced.
    pub fn remove_if(&self, index: usize, part: &Part) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let matches = inner
            .entries
            .get(&index)
            .is_some_and(|stored| stored.same_handle(part));
        if matches {
            inner.entries.remove(&index);
            inner.recency.shift_remove(&index);
        }
        matches
    }

    /// Peek without touching recency
    pub fn get(&self, index: usize) -> Option<Part> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.get(&index).cloned()
    }

    pub fn contains(&self, index: usize) -> bool {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Recency order snapshot, least recently touched first
    pub fn recency_snapshot(&self) -> Vec<usize> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.recency.iter().copied().collect()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}
