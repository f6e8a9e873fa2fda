//! Process-lifetime caches for upstream data.
//!
//! [`ExpiringCache`] is a concurrent key/value store whose entries expire after a fixed
//! window, or never for data that can't change (name to id mappings, entity names).
//! [`RequestCoalescer`] sits in front of one cache and makes sure concurrent misses for the
//! same key only reach the network once. [`ProfileCaches`] bundles the caches used by the
//! profile merge engine so one set can be created per server (or per test).

pub mod coalescer;
pub mod profile;

pub use coalescer::RequestCoalescer;
pub use profile::ProfileCaches;

use std::{borrow::Borrow, hash::Hash, time::Duration};

use dashmap::DashMap;
use tokio::time::Instant;

/// How long a cache entry stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Entry is valid for the given duration after insertion.
    After(Duration),
    /// Entry never expires.
    Never,
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted: Instant,
    expiry: Expiry,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        match self.expiry {
            Expiry::After(ttl) => now.saturating_duration_since(self.inserted) >= ttl,
            Expiry::Never => false,
        }
    }
}

/// Concurrent cache with per-entry expiry.
///
/// Reads never return a value older than its expiry window; an expired entry found by
/// [`get`](Self::get) is removed on the spot. Writes to the same key overwrite each other,
/// the last `set` wins.
#[derive(Debug)]
pub struct ExpiringCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, CacheEntry<V>>,
    default_expiry: Expiry,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty cache whose entries use `default_expiry` unless told otherwise.
    pub fn new(default_expiry: Expiry) -> Self {
        Self {
            entries: DashMap::new(),
            default_expiry,
        }
    }

    /// Creates an empty cache whose entries expire `ttl` after insertion.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::new(Expiry::After(ttl))
    }

    /// Returns a clone of the cached value if present and not expired.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();

        // The read guard must be released before removing, DashMap shards deadlock otherwise
        let lookup = self.entries.get(key).map(|entry| {
            if entry.is_expired(now) {
                None
            } else {
                Some(entry.value.clone())
            }
        });

        match lookup {
            Some(Some(value)) => Some(value),
            Some(None) => {
                self.entries.remove_if(key, |_, entry| entry.is_expired(now));
                None
            }
            None => None,
        }
    }

    /// Inserts a value using the cache's default expiry.
    pub fn set(&self, key: K, value: V) {
        self.set_with_expiry(key, value, self.default_expiry);
    }

    /// Inserts a value with an explicit expiry.
    pub fn set_with_expiry(&self, key: K, value: V, expiry: Expiry) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted: Instant::now(),
                expiry,
            },
        );
    }

    /// Removes every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
