//! Read cache for the published configuration.
//!
//! Entries expire lazily on read after the configured TTL. `invalidate_all`
//! also bumps a generation counter; a reader that captured the generation
//! before going to the store fills through [`ReadCache::set_if_current`], so a
//! read that straddles a publish cannot re-cache the pre-publish document.
//!
//! The cache fails open: a poisoned lock is reported as a miss.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::models::PublishedProjection;

/// Key under which the public configuration is cached.
pub const PUBLIC_CONFIG_KEY: &str = "published";

/// Cache in front of `loadPublic`.
pub type PublicConfigCache = ReadCache<&'static str, PublishedProjection>;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests.
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap();
        *offset += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap()
    }
}

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

struct CacheState<K, V> {
    entries: HashMap<K, Entry<V>>,
    generation: u64,
}

/// TTL-bounded, per-process cache.
pub struct ReadCache<K, V> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState<K, V>>,
}

impl<K, V> ReadCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                generation: 0,
            }),
        }
    }

    /// Cache using the wall clock.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::new(ttl, Arc::new(SystemClock))
    }

    fn lock(&self) -> Option<MutexGuard<'_, CacheState<K, V>>> {
        match self.state.lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                tracing::warn!("Read cache lock poisoned, treating as miss");
                None
            }
        }
    }

    /// Return a value inserted less than `ttl` ago; stale entries are evicted.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut state = self.lock()?;
        let now = self.clock.now();

        let fresh = match state.entries.get(key) {
            Some(entry) => now.saturating_duration_since(entry.inserted_at) < self.ttl,
            None => return None,
        };

        if fresh {
            state.entries.get(key).map(|entry| entry.value.clone())
        } else {
            state.entries.remove(key);
            None
        }
    }

    pub fn set(&self, key: K, value: V) {
        let Some(mut state) = self.lock() else {
            return;
        };
        let inserted_at = self.clock.now();
        state.entries.insert(key, Entry { value, inserted_at });
    }

    /// Current invalidation generation; capture before reading the store.
    pub fn generation(&self) -> u64 {
        self.lock().map(|state| state.generation).unwrap_or(u64::MAX)
    }

    /// Insert only if no invalidation happened since `generation` was read.
    pub fn set_if_current(&self, key: K, value: V, generation: u64) -> bool {
        let Some(mut state) = self.lock() else {
            return false;
        };
        if state.generation != generation {
            tracing::debug!("Dropping cache fill from generation {}", generation);
            return false;
        }
        let inserted_at = self.clock.now();
        state.entries.insert(key, Entry { value, inserted_at });
        true
    }

    /// Drop every entry. Always succeeds, even on a poisoned lock.
    pub fn invalidate_all(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.entries.clear();
        state.generation = state.generation.wrapping_add(1);
        tracing::debug!("Read cache invalidated (generation {})", state.generation);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().map(|state| state.entries.len()).unwrap_or(0)
    }
}
