//! Memoizing wrapper around [`compute_haco`].
//!
//! Keyed by (hash of the candle window, params). The engine stays pure; this
//! type owns all the mutable state and is meant to live in the caller, e.g. a
//! watcher that re-evaluates the same windows on every poll.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};

use crate::domain::candle::Candle;
use crate::domain::haco::{HacoResult, compute_haco};
use crate::domain::params::HacoParams;

pub const DEFAULT_CACHE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    window_hash: u64,
    params: HacoParams,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    candles: Vec<Candle<T>>,
    result: HacoResult<T>,
}

/// Hash over every candle's time and the bit patterns of its prices.
pub fn window_hash<T: Hash>(candles: &[Candle<T>]) -> u64 {
    let mut hasher = DefaultHasher::new();
    candles.len().hash(&mut hasher);
    for c in candles {
        c.time.hash(&mut hasher);
        for v in [c.open, c.high, c.low, c.close] {
            v.to_bits().hash(&mut hasher);
        }
    }
    hasher.finish()
}

#[derive(Debug)]
pub struct CachedEngine<T> {
    capacity: usize,
    entries: HashMap<CacheKey, Entry<T>>,
    order: VecDeque<CacheKey>,
    hits: u64,
    misses: u64,
}

impl<T: Clone + Hash + PartialEq> CachedEngine<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Same output as [`compute_haco`]; repeated (window, params) pairs are
    /// served from the cache. A hash collision is detected by comparing the
    /// stored window and falls back to recomputing.
    pub fn compute(&mut self, candles: &[Candle<T>], params: &HacoParams) -> HacoResult<T> {
        let key = CacheKey {
            window_hash: window_hash(candles),
            params: *params,
        };

        if let Some(entry) = self.entries.get(&key) {
            if entry.candles.as_slice() == candles {
                self.hits += 1;
                return entry.result.clone();
            }
        }

        self.misses += 1;
        let result = compute_haco(candles, params);
        self.insert(key, candles.to_vec(), result.clone());
        result
    }

    fn insert(&mut self, key: CacheKey, candles: Vec<Candle<T>>, result: HacoResult<T>) {
        if self.entries.insert(key, Entry { candles, result }).is_none() {
            self.order.push_back(key);
        }
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

impl<T: Clone + Hash + PartialEq> Default for CachedEngine<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
