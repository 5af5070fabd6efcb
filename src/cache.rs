//! Time-bounded caches with single-flight de-duplication.
//!
//! Authorization checks hammer the same handful of keys (one path per
//! data directory, one identity per session) against a slow backing
//! store, so every expensive lookup sits behind a [`TtlCache`]: an
//! explicit map with stored insertion timestamps rather than a decorator
//! mechanism, with the TTL as a constructor parameter.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use once_cell::sync::OnceCell;

use crate::error::Result;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Slot<V> {
    inserted_at: Instant,
    cell: Arc<OnceCell<V>>,
}

/// Map from key to a value that expires `ttl` after insertion.
///
/// Concurrent misses on the same fresh key coalesce into a single fetch:
/// they share one cell, exactly one caller runs the fetch, and the rest
/// block until it completes. A failed fetch leaves the cell empty so the
/// next caller retries; it does not poison the slot. Callers that go away
/// while waiting do not cancel the in-flight fetch: the fetching caller
/// completes and populates the cell regardless.
pub struct TtlCache<K, V> {
    ttl: Duration,
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    #[must_use]
    pub fn new(ttl: Duration) -> TtlCache<K, V> {
        TtlCache {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value for `key`, running `fetch` on a miss.
    ///
    /// An expired slot is replaced lazily here; [`evict_expired`] exists
    /// for callers that want to sweep without touching keys.
    ///
    /// [`evict_expired`]: TtlCache::evict_expired
    pub fn get_or_fetch<F>(&self, key: &K, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        let cell = {
            let mut slots = lock(&self.slots);
            let fresh = slots
                .get(key)
                .is_some_and(|slot| slot.inserted_at.elapsed() < self.ttl);
            if !fresh {
                slots.insert(
                    key.clone(),
                    Slot {
                        inserted_at: Instant::now(),
                        cell: Arc::new(OnceCell::new()),
                    },
                );
            }
            Arc::clone(&slots[key].cell)
        };

        cell.get_or_try_init(fetch).cloned()
    }

    /// Drop the slot for `key`, cached or in flight.
    pub fn invalidate(&self, key: &K) {
        lock(&self.slots).remove(key);
    }

    /// Sweep every expired slot.
    pub fn evict_expired(&self) {
        let ttl = self.ttl;
        lock(&self.slots).retain(|_, slot| slot.inserted_at.elapsed() < ttl);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.slots).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.slots).is_empty()
    }
}
