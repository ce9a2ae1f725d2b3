use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// In-memory TTL memoization for upstream lookups. An entry is fresh
/// while `now - stored_at < ttl`; stale entries are lazily overwritten
/// on the next fetch, never proactively evicted. Growth is unbounded,
/// which is acceptable for the low-traffic deployment this serves.
pub struct TtlCache<T> {
    ttl: Duration,
    entries: RwLock<HashMap<String, (Instant, T)>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            _ => None,
        }
    }

    pub async fn insert(&self, key: String, value: T) {
        let mut entries = self.entries.write().await;
        entries.insert(key, (Instant::now(), value));
    }

    /// Returns the cached value if it is still fresh, otherwise runs
    /// `fetch` and stores its result. Fetch errors are not cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let value = fetch().await?;
        self.insert(key.to_string(), value.clone()).await;
        Ok(value)
    }
}

/// Cache key for coordinate lookups. Rounding to 4 decimals (~11 m) is
/// the dedup policy: nearby requests collapse to the same cache line.
pub fn coord_key(lat: f64, lon: f64) -> String {
    format!("{:.4},{:.4}", lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_second_lookup_within_ttl_skips_fetch() {
        let cache = TtlCache::new(Duration::from_secs(600));
        let calls = AtomicUsize::new(0);

        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(42u32)
        };
        assert_eq!(cache.get_or_fetch("Zürich", fetch).await, Ok(42));

        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(99u32)
        };
        // Fresh entry, fetch must not run again and the old value wins.
        assert_eq!(cache.get_or_fetch("Zürich", fetch).await, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_fetches_again() {
        let cache = TtlCache::new(Duration::from_millis(20));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let fetch = || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>("payload".to_string())
            };
            cache.get_or_fetch("Basel", fetch).await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_error_is_not_cached() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(600));
        let calls = AtomicUsize::new(0);

        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<u32, _>("boom")
        };
        assert!(cache.get_or_fetch("Bern", fetch).await.is_err());

        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, &str>(7u32)
        };
        assert_eq!(cache.get_or_fetch("Bern", fetch).await, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_coord_key_rounding_collapses_nearby_points() {
        assert_eq!(
            coord_key(47.37690001, 8.54170001),
            coord_key(47.3769, 8.5417)
        );
        assert_eq!(coord_key(47.3769, 8.5417), "47.3769,8.5417");
    }
}
