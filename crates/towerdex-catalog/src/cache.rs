//! Stale-while-revalidate cache in front of a [`Fetch`] implementation.
//!
//! One [`QueryCache`] serves one record type under any number of
//! [`CollectionKey`]s:
//!
//! - a fresh entry is returned as is
//! - a stale entry is returned immediately while one background refresh runs
//! - a missing entry is fetched and awaited
//!
//! Concurrent callers for the same key share a single in-flight fetch.
//! Invalidation bumps a per-entry generation; a fetch that started before the
//! bump still stores its data when it lands, but the entry stays stale.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::Result;
use crate::fetch::Fetch;
use crate::key::CollectionKey;

/// Default freshness window for browsable collections.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Freshness window for lookup tables that rarely change, such as gear types.
pub const LOOKUP_STALE_TIME: Duration = Duration::from_secs(60 * 60);

type SharedFetch<T> = Shared<BoxFuture<'static, Result<Arc<Vec<T>>>>>;

/// Cache counters, as returned by [`QueryCache::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub stale_hits: u64,
    pub misses: u64,
    pub fetches: u64,
    pub failures: u64,
    pub invalidations: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    stale_hits: AtomicU64,
    misses: AtomicU64,
    fetches: AtomicU64,
    failures: AtomicU64,
    invalidations: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            stale_hits: self.stale_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

struct Entry<T> {
    data: Option<Arc<Vec<T>>>,
    fetched_at: Option<Instant>,
    /// Generation the cached data was fetched under.
    data_generation: u64,
    /// Bumped by every invalidation.
    generation: u64,
    in_flight: Option<SharedFetch<T>>,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Entry {
            data: None,
            fetched_at: None,
            data_generation: 0,
            generation: 0,
            in_flight: None,
        }
    }
}

impl<T> Entry<T> {
    fn is_fresh(&self, stale_time: Duration, now: Instant) -> bool {
        self.data.is_some()
            && self.data_generation == self.generation
            && self
                .fetched_at
                .is_some_and(|at| now.saturating_duration_since(at) < stale_time)
    }
}

struct Inner<T> {
    name: String,
    stale_time: Duration,
    fetcher: Arc<dyn Fetch<T>>,
    entries: Mutex<HashMap<CollectionKey, Entry<T>>>,
    counters: Counters,
}

impl<T> Inner<T>
where
    T: Send + Sync + 'static,
{
    /// Joins the entry's in-flight fetch or starts one. The flag is `true`
    /// when a new fetch was created.
    fn start_fetch(self: &Arc<Self>, key: &CollectionKey, entry: &mut Entry<T>) -> (SharedFetch<T>, bool) {
        if let Some(pending) = &entry.in_flight {
            return (pending.clone(), false);
        }

        let inner = Arc::clone(self);
        let key = key.clone();
        let generation = entry.generation;
        let pending = async move {
            Counters::bump(&inner.counters.fetches, 1);
            debug!(cache = %inner.name, key = %key, generation, "fetching");
            let result = inner.fetcher.fetch(&key).await.map(Arc::new);
            inner.complete(&key, generation, &result);
            result
        }
        .boxed()
        .shared();

        entry.in_flight = Some(pending.clone());
        (pending, true)
    }

    fn complete(&self, key: &CollectionKey, generation: u64, result: &Result<Arc<Vec<T>>>) {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if entry.generation == generation {
            entry.in_flight = None;
        }

        match result {
            Ok(data) if entry.data.is_none() || generation >= entry.data_generation => {
                entry.data = Some(Arc::clone(data));
                entry.data_generation = generation;
                entry.fetched_at = Some(Instant::now());
                debug!(
                    cache = %self.name,
                    key = %key,
                    rows = data.len(),
                    stale = generation != entry.generation,
                    "fetched"
                );
            }
            Ok(_) => {
                debug!(cache = %self.name, key = %key, "discarding superseded fetch");
            }
            Err(err) => {
                Counters::bump(&self.counters.failures, 1);
                warn!(cache = %self.name, key = %key, error = %err, "fetch failed");
            }
        }
    }
}

/// A keyed, stale-while-revalidate cache for one record type.
///
/// Cloning is cheap and every clone shares the same entries.
pub struct QueryCache<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        QueryCache {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for QueryCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("name", &self.inner.name)
            .field("stale_time", &self.inner.stale_time)
            .field("entries", &self.inner.entries.lock().len())
            .finish()
    }
}

impl<T> QueryCache<T>
where
    T: Send + Sync + 'static,
{
    /// Creates a cache named `name` (used in logs) over `fetcher`.
    pub fn new(name: impl Into<String>, fetcher: Arc<dyn Fetch<T>>, stale_time: Duration) -> Self {
        QueryCache {
            inner: Arc::new(Inner {
                name: name.into(),
                stale_time,
                fetcher,
                entries: Mutex::new(HashMap::new()),
                counters: Counters::default(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn stale_time(&self) -> Duration {
        self.inner.stale_time
    }

    /// Returns the collection under `key`.
    ///
    /// A stale entry is returned immediately and refreshed in the background
    /// on the current tokio runtime.
    pub async fn get(&self, key: &CollectionKey) -> Result<Arc<Vec<T>>> {
        let pending = {
            let mut entries = self.inner.entries.lock();
            let entry = entries.entry(key.clone()).or_default();

            if entry.is_fresh(self.inner.stale_time, Instant::now()) {
                if let Some(data) = &entry.data {
                    Counters::bump(&self.inner.counters.hits, 1);
                    debug!(cache = %self.inner.name, key = %key, "hit");
                    return Ok(Arc::clone(data));
                }
            }

            match entry.data.clone() {
                Some(data) => {
                    Counters::bump(&self.inner.counters.stale_hits, 1);
                    let (refresh, started) = self.inner.start_fetch(key, entry);
                    if started {
                        debug!(cache = %self.inner.name, key = %key, "stale hit, refreshing");
                        tokio::spawn(refresh);
                    }
                    return Ok(data);
                }
                None => {
                    Counters::bump(&self.inner.counters.misses, 1);
                    debug!(cache = %self.inner.name, key = %key, "miss");
                    self.inner.start_fetch(key, entry).0
                }
            }
        };

        pending.await
    }

    /// Cached data for `key` without fetching, fresh or not.
    pub fn peek(&self, key: &CollectionKey) -> Option<Arc<Vec<T>>> {
        self.inner
            .entries
            .lock()
            .get(key)
            .and_then(|entry| entry.data.clone())
    }

    /// Returns `true` unless `key` holds fresh data.
    pub fn is_stale(&self, key: &CollectionKey) -> bool {
        self.inner
            .entries
            .lock()
            .get(key)
            .map_or(true, |entry| !entry.is_fresh(self.inner.stale_time, Instant::now()))
    }

    /// Marks every entry under `prefix` stale. Returns how many were marked.
    ///
    /// Cached data stays available for stale hits. In-flight fetches are
    /// detached: their callers still get a result, but the next `get` starts
    /// a new fetch.
    pub fn invalidate(&self, prefix: &CollectionKey) -> usize {
        let mut entries = self.inner.entries.lock();
        let mut marked = 0;
        for (_, entry) in entries.iter_mut().filter(|(key, _)| key.starts_with(prefix)) {
            entry.generation += 1;
            entry.in_flight = None;
            marked += 1;
        }
        Counters::bump(&self.inner.counters.invalidations, marked as u64);
        debug!(cache = %self.inner.name, prefix = %prefix, marked, "invalidated");
        marked
    }

    /// Marks every entry stale.
    pub fn invalidate_all(&self) -> usize {
        self.invalidate(&CollectionKey::new(Vec::<String>::new()))
    }

    /// Drops every entry under `prefix`, data and all. Returns how many
    /// were dropped.
    ///
    /// Per-user keys are never reused once their user is gone, so marking
    /// them stale would keep them forever. A fetch still in flight for a
    /// dropped key completes for its callers without storing anything.
    pub fn remove(&self, prefix: &CollectionKey) -> usize {
        let mut entries = self.inner.entries.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - entries.len();
        debug!(cache = %self.inner.name, prefix = %prefix, removed, "removed");
        removed
    }

    /// Number of keys with an entry.
    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.counters.snapshot()
    }
}
