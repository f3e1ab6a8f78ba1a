//! Response cache keyed by (endpoint, parameters) with per-endpoint freshness.

use analysis_core::AnalysisError;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// How long stale entries are kept before they are dropped from the map.
pub const DEFAULT_GC_GRACE: Duration = Duration::from_secs(5 * 60);

/// How long an entry stays fresh, what happens once it is stale, and when it
/// is evicted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachePolicy {
    /// `None` never goes stale
    pub max_age: Option<Duration>,
    /// Serve stale entries immediately and refresh them in a spawned task
    pub revalidate_in_background: bool,
    /// Entries older than this are removed on the next insert; `None` keeps them
    pub gc_after: Option<Duration>,
}

impl CachePolicy {
    pub const fn forever() -> Self {
        Self { max_age: None, revalidate_in_background: false, gc_after: None }
    }

    pub const fn fresh_for(max_age: Duration) -> Self {
        Self {
            max_age: Some(max_age),
            revalidate_in_background: false,
            gc_after: Some(max_age.saturating_add(DEFAULT_GC_GRACE)),
        }
    }

    pub const fn stale_while_revalidate(max_age: Duration) -> Self {
        Self {
            max_age: Some(max_age),
            revalidate_in_background: true,
            gc_after: Some(max_age.saturating_add(DEFAULT_GC_GRACE)),
        }
    }

    pub const fn with_gc_after(self, gc_after: Duration) -> Self {
        Self { gc_after: Some(gc_after), ..self }
    }
}

fn age_of(cached_at: DateTime<Utc>) -> Duration {
    Utc::now()
        .signed_duration_since(cached_at)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

enum Lookup<T> {
    Fresh(T),
    Stale(T),
    Miss,
}

pub struct ResponseCache<T> {
    name: &'static str,
    policy: CachePolicy,
    entries: DashMap<String, CacheEntry<T>>,
    /// Keys with a background refresh in flight
    refreshing: DashSet<String>,
}

impl<T> ResponseCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, policy: CachePolicy) -> Self {
        Self {
            name,
            policy,
            entries: DashMap::new(),
            refreshing: DashSet::new(),
        }
    }

    fn lookup(&self, key: &str) -> Lookup<T> {
        let Some(entry) = self.entries.get(key) else {
            return Lookup::Miss;
        };

        let fresh = match self.policy.max_age {
            None => true,
            Some(max_age) => age_of(entry.cached_at) < max_age,
        };

        if fresh {
            Lookup::Fresh(entry.data.clone())
        } else {
            Lookup::Stale(entry.data.clone())
        }
    }

    pub fn insert(&self, key: String, data: T) {
        self.evict_expired();
        self.entries.insert(key, CacheEntry { data, cached_at: Utc::now() });
    }

    /// Drop entries past the policy's eviction horizon.
    pub fn evict_expired(&self) {
        let Some(gc_after) = self.policy.gc_after else {
            return;
        };
        let before = self.entries.len();
        self.entries.retain(|_, entry| age_of(entry.cached_at) < gc_after);
        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            tracing::debug!("{} cache evicted {} expired entries", self.name, evicted);
        }
    }

    /// Drop `key`; returns whether anything was cached under it.
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the cached value for `key`, calling `fetch` on a miss or when
    /// stale. Fetch errors are returned and never cached.
    pub async fn get_or_fetch<F, Fut>(self: &Arc<Self>, key: String, fetch: F) -> Result<T, AnalysisError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, AnalysisError>> + Send + 'static,
    {
        match self.lookup(&key) {
            Lookup::Fresh(data) => {
                tracing::debug!("{} cache hit: {}", self.name, key);
                return Ok(data);
            }
            Lookup::Stale(data) if self.policy.revalidate_in_background => {
                self.spawn_refresh(key, fetch);
                return Ok(data);
            }
            Lookup::Stale(_) => tracing::debug!("{} cache stale: {}", self.name, key),
            Lookup::Miss => tracing::debug!("{} cache miss: {}", self.name, key),
        }

        let data = fetch().await?;
        self.insert(key, data.clone());
        Ok(data)
    }

    fn spawn_refresh<F, Fut>(self: &Arc<Self>, key: String, fetch: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, AnalysisError>> + Send + 'static,
    {
        if !self.refreshing.insert(key.clone()) {
            tracing::debug!("{} refresh already running: {}", self.name, key);
            return;
        }

        tracing::debug!("{} serving stale entry, refreshing: {}", self.name, key);
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            match fetch().await {
                Ok(data) => cache.insert(key.clone(), data),
                Err(e) => tracing::warn!("{} background refresh failed for {}: {}", cache.name, key, e),
            }
            cache.refreshing.remove(&key);
        });
    }
}
