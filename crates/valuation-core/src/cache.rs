//! Expiring per-industry cache for computed averages

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

use crate::config::DEFAULT_AVERAGE_TTL;
use crate::model::IndustryAverage;
use crate::store::SnapshotStore;

/// Wall-clock source in unix seconds
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> i64;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Manually advanced clock
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Cached average for one industry label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub industry: String,
    pub value: IndustryAverage,
    /// Unix seconds; the entry is stale once `now >= expires_at`
    pub expires_at: i64,
}

impl CacheEntry {
    pub fn is_live(&self, now: i64) -> bool {
        now < self.expires_at
    }
}

/// Thread-safe, time-expiring cache of industry averages
///
/// Concurrent misses for the same label are serialized so only one
/// computation runs; other labels are not blocked.
#[derive(Clone)]
pub struct AveragesCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    inflight: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    store: Option<Arc<SnapshotStore>>,
    /// Held from snapshot to rename so saves land in insertion order
    persist: Arc<Mutex<()>>,
}

impl fmt::Debug for AveragesCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AveragesCache")
            .field("ttl", &self.ttl)
            .field("clock", &self.clock)
            .field("persistent", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for AveragesCache {
    fn default() -> Self {
        Self::new(DEFAULT_AVERAGE_TTL)
    }
}

impl AveragesCache {
    /// Create an in-memory cache with the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create an in-memory cache driven by a custom clock
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            inflight: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            clock,
            store: None,
            persist: Arc::new(Mutex::new(())),
        }
    }

    /// Back the cache with a snapshot file, restoring unexpired entries
    pub fn persistent(ttl: Duration, clock: Arc<dyn Clock>, store: SnapshotStore) -> Self {
        let now = clock.now();
        let restored: HashMap<String, CacheEntry> = store
            .load()
            .into_iter()
            .filter(|entry| entry.is_live(now))
            .map(|entry| (entry.industry.clone(), entry))
            .collect();
        tracing::debug!(
            entries = restored.len(),
            path = %store.path().display(),
            "Restored industry averages"
        );

        let mut cache = Self::with_clock(ttl, clock);
        cache.entries = Arc::new(RwLock::new(restored));
        cache.store = Some(Arc::new(store));
        cache
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Live value for `industry`, without computing
    pub async fn peek(&self, industry: &str) -> Option<IndustryAverage> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        entries
            .get(industry)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value)
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        entries.values().filter(|e| e.is_live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Get a live value or compute and store it with the default TTL
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        industry: &str,
        compute: F,
    ) -> Result<IndustryAverage, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<IndustryAverage, E>>,
    {
        self.get_or_compute_with_ttl(industry, self.ttl, compute).await
    }

    /// Get a live value or compute and store it for `ttl`.
    ///
    /// A failed computation stores nothing.
    pub async fn get_or_compute_with_ttl<F, Fut, E>(
        &self,
        industry: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<IndustryAverage, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<IndustryAverage, E>>,
    {
        if let Some(value) = self.peek(industry).await {
            tracing::debug!(%industry, "Cache hit");
            return Ok(value);
        }

        let flight = self.flight_lock(industry).await;
        let _guard = flight.lock().await;

        // Filled while waiting on the flight lock
        if let Some(value) = self.peek(industry).await {
            tracing::debug!(%industry, "Cache hit after wait");
            return Ok(value);
        }

        tracing::debug!(%industry, "Cache miss");
        let value = compute().await?;
        self.insert(industry, value, ttl).await;
        Ok(value)
    }

    async fn flight_lock(&self, industry: &str) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().await;
        Arc::clone(inflight.entry(industry.to_string()).or_default())
    }

    async fn insert(&self, industry: &str, value: IndustryAverage, ttl: Duration) {
        let now = self.clock.now();
        let entry = CacheEntry {
            industry: industry.to_string(),
            value,
            expires_at: now.saturating_add(ttl.as_secs() as i64),
        };

        let Some(store) = &self.store else {
            self.entries.write().await.insert(industry.to_string(), entry);
            return;
        };

        let _persist = self.persist.lock().await;
        let snapshot: Vec<CacheEntry> = {
            let mut entries = self.entries.write().await;
            entries.insert(industry.to_string(), entry);
            entries.values().filter(|e| e.is_live(now)).cloned().collect()
        };

        let store = Arc::clone(store);
        let path = store.path().to_path_buf();
        if let Err(e) = tokio::task::spawn_blocking(move || store.save_or_warn(&snapshot)).await {
            tracing::warn!(path = %path.display(), error = %e, "Snapshot task failed");
        }
    }
}
