//! Parameter-keyed TTL cache for computed bundles.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Default lifetime of a cached bundle.
pub const CACHE_TTL: Duration = Duration::from_secs(600);

/// In-memory TTL cache. Values are handed out as `Arc<V>` so a hit is cheap
/// and an entry aging out never invalidates a reader mid-render.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (Instant, Arc<V>)>>,
}

impl<K: Eq + Hash, V> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// A fresh entry, or None. Expired entries are evicted on read.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((inserted, value)) = entries.get(key) {
            if inserted.elapsed() < self.ttl {
                return Some(Arc::clone(value));
            }
        } else {
            return None;
        }
        entries.remove(key);
        None
    }

    /// Store a value and return the shared handle for immediate use.
    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, (Instant::now(), Arc::clone(&value)));
        value
    }

    /// Drop every entry, fresh or not.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
