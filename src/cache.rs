//! Bounded least-recently-used cache shared by concurrent lookups.
//!
//! Recency is tracked with a monotonically increasing stamp per entry and an
//! ordered index from stamp to key, so promotion and eviction are both
//! `O(log n)`. All mutation happens under a single [`parking_lot::Mutex`].

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

use ahash::AHashMap;
use parking_lot::Mutex;

struct Slot<V> {
    value: V,
    stamp: u64,
}

struct LruInner<K, V> {
    entries: AHashMap<K, Slot<V>>,
    recency: BTreeMap<u64, K>,
    next_stamp: u64,
}

impl<K: Hash + Eq + Clone, V> LruInner<K, V> {
    fn bump(&mut self) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        stamp
    }

    fn evict_oldest(&mut self) -> Option<K> {
        let (_, key) = self.recency.pop_first()?;
        self.entries.remove(&key);
        Some(key)
    }
}

/// A fixed-capacity cache with strict LRU eviction and no expiry.
pub struct LruCache<K, V> {
    capacity: usize,
    inner: Mutex<LruInner<K, V>>,
}

impl<K: Hash + Eq + Clone, V: Clone> LruCache<K, V> {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A zero capacity yields a cache that never stores anything.
    pub fn new(capacity: usize) -> Self {
        LruCache {
            capacity,
            inner: Mutex::new(LruInner {
                entries: AHashMap::with_capacity(capacity),
                recency: BTreeMap::new(),
                next_stamp: 0,
            }),
        }
    }

    /// Look up a key, promoting it to most recently used on a hit.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.inner.lock();
        let stamp = inner.bump();
        let inner = &mut *inner;
        let slot = inner.entries.get_mut(key)?;
        if let Some(owner) = inner.recency.remove(&slot.stamp) {
            inner.recency.insert(stamp, owner);
        }
        slot.stamp = stamp;
        Some(slot.value.clone())
    }

    /// Whether a key is cached, without touching its recency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().entries.contains_key(key)
    }

    /// Insert or replace a value, making it the most recently used.
    ///
    /// Returns the key evicted to make room, if any.
    pub fn put(&self, key: K, value: V) -> Option<K> {
        if self.capacity == 0 {
            return None;
        }
        let mut inner = self.inner.lock();
        let stamp = inner.bump();

        if let Some(slot) = inner.entries.get_mut(&key) {
            let old_stamp = slot.stamp;
            slot.value = value;
            slot.stamp = stamp;
            inner.recency.remove(&old_stamp);
            inner.recency.insert(stamp, key);
            return None;
        }

        let evicted = if inner.entries.len() >= self.capacity {
            inner.evict_oldest()
        } else {
            None
        };
        inner.recency.insert(stamp, key.clone());
        inner.entries.insert(key, Slot { value, stamp });
        evicted
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.recency.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("len", &self.inner.lock().entries.len())
            .finish()
    }
}
