use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::NaiveDateTime;
use parking_lot::Mutex;

use crate::models::OhlcvBar;

/// Default number of cached result sets kept in memory.
pub const DEFAULT_CACHE_SIZE: usize = 10;

/// Identifies one cached read: a backing table plus the half-open window the
/// read covered (`None` for whole-table reads).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    table: String,
    window: Option<(NaiveDateTime, NaiveDateTime)>,
}

impl CacheKey {
    pub fn new(table: &str, window: Option<(NaiveDateTime, NaiveDateTime)>) -> Self {
        Self {
            table: table.to_string(),
            window,
        }
    }
}

/// Bounded LRU of recently read bar sets, to spare the database repeated
/// identical fetches.
///
/// Thread-safe; a capacity of zero disables caching entirely.
pub struct BarCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<CacheKey, Arc<Vec<OhlcvBar>>>,
    // Front is least recently used.
    recency: VecDeque<CacheKey>,
}

impl BarCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<Vec<OhlcvBar>>> {
        let mut inner = self.inner.lock();
        let hit = inner.entries.get(key).cloned()?;
        inner.recency.retain(|k| k != key);
        inner.recency.push_back(key.clone());
        Some(hit)
    }

    pub fn put(&self, key: CacheKey, bars: Arc<Vec<OhlcvBar>>) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.inner.lock();
        if inner.entries.contains_key(&key) {
            inner.recency.retain(|k| k != &key);
        } else if inner.entries.len() == self.capacity {
            if let Some(oldest) = inner.recency.pop_front() {
                inner.entries.remove(&oldest);
            }
        }
        inner.entries.insert(key.clone(), bars);
        inner.recency.push_back(key);
    }

    /// Drop every cached read backed by `table`. Called after an upsert so
    /// readers never see pre-write data.
    pub fn invalidate_table(&self, table: &str) {
        let mut inner = self.inner.lock();
        inner.entries.retain(|k, _| k.table != table);
        inner.recency.retain(|k| k.table != table);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for BarCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(table: &str) -> CacheKey {
        CacheKey::new(table, None)
    }

    fn bars() -> Arc<Vec<OhlcvBar>> {
        Arc::new(Vec::new())
    }

    #[test]
    fn test_cache_stores_and_retrieves() {
        let cache = BarCache::new(2);
        cache.put(key("aapl_daily"), bars());
        assert!(cache.get(&key("aapl_daily")).is_some());
        assert!(cache.get(&key("msft_daily")).is_none());
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = BarCache::new(2);
        cache.put(key("a_daily"), bars());
        cache.put(key("b_daily"), bars());

        // Touch a so b becomes the eviction candidate.
        cache.get(&key("a_daily"));
        cache.put(key("c_daily"), bars());

        assert!(cache.get(&key("a_daily")).is_some());
        assert!(cache.get(&key("b_daily")).is_none());
        assert!(cache.get(&key("c_daily")).is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_replacing_entry_does_not_evict() {
        let cache = BarCache::new(2);
        cache.put(key("a_daily"), bars());
        cache.put(key("b_daily"), bars());
        cache.put(key("a_daily"), bars());
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("b_daily")).is_some());
    }

    #[test]
    fn test_invalidate_table_drops_all_windows() {
        let cache = BarCache::new(4);
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        cache.put(CacheKey::new("aapl_intraday", Some((ts, ts))), bars());
        cache.put(key("aapl_intraday"), bars());
        cache.put(key("msft_daily"), bars());

        cache.invalidate_table("aapl_intraday");

        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("msft_daily")).is_some());
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let cache = BarCache::new(0);
        cache.put(key("a_daily"), bars());
        assert!(cache.is_empty());
        assert!(cache.get(&key("a_daily")).is_none());
    }
}
