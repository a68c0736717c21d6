use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Upstream snapshots go stale quickly during live rounds; 90 seconds
/// keeps repeated duels cheap without serving dead data.
pub const CACHE_TTL_MS: u64 = 90_000;

#[derive(Debug)]
struct Entry<T> {
    value: T,
    stored_at: Instant,
}

/// In-process TTL cache, one instance per upstream resource kind.
/// Entries expire on read; there is no background eviction and no size
/// bound. Concurrent readers may both miss a key and both fetch; the
/// last `put` wins.
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry<T>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn standard() -> Self {
        Self::new(Duration::from_millis(CACHE_TTL_MS))
    }

    /// Clone out a live entry. An entry at or past the TTL is dropped
    /// from the map before returning the miss.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock().expect("ttl cache lock poisoned");
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: &str, value: T) {
        let mut entries = self.entries.lock().expect("ttl cache lock poisoned");
        entries.insert(
            key.to_string(),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("ttl cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entry_round_trips() {
        let cache = TtlCache::new(Duration::from_secs(3600));
        cache.put("standings:39:2024", "body".to_string());
        assert_eq!(cache.get("standings:39:2024").as_deref(), Some("body"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn zero_ttl_expires_on_read() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.put("k", 7u32);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn put_overwrites() {
        let cache = TtlCache::new(Duration::from_secs(3600));
        cache.put("k", 1u32);
        cache.put("k", 2u32);
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unknown_key_misses() {
        let cache: TtlCache<String> = TtlCache::standard();
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn shared_across_threads() {
        use std::sync::Arc;

        let cache = Arc::new(TtlCache::new(Duration::from_secs(3600)));
        let writer = Arc::clone(&cache);
        let handle = std::thread::spawn(move || {
            for i in 0..100u32 {
                writer.put(&format!("k{i}"), i);
            }
        });
        for _ in 0..100 {
            let _ = cache.get("k50");
        }
        handle.join().expect("writer thread");
        assert_eq!(cache.len(), 100);
    }
}
