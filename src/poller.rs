//! Document poller
//!
//! The orchestrator tying the pieces together: it answers reads from the
//! in-memory cache, runs refresh cycles through the conditional fetcher,
//! fans confirmed changes out to registered listeners, and owns the poll
//! scheduler that repeats refreshes on a timer.
//!
//! Refresh cycles are single-flight: while one is in progress, concurrent
//! `get_update` calls wait for it and adopt its result instead of issuing a
//! second fetch. A scheduler tick racing a manual refresh therefore produces
//! one store request and at most one notification per remote change.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use crate::cache::ObjectCache;
use crate::error::{ConfigError, PollError, StoreError};
use crate::fetch::{ConditionalFetcher, FetchOutcome};
use crate::listener::{ListenerRegistry, UpdateListener};
use crate::marker::Marker;
use crate::schedule::PollScheduler;
use crate::store::BlobStore;

struct PollerInner {
    fetcher: ConditionalFetcher,
    cache: Mutex<ObjectCache>,
    listeners: Mutex<ListenerRegistry>,
    scheduler: Mutex<PollScheduler>,
    /// Serializes refresh cycles; held across the fetch await point
    refresh_gate: AsyncMutex<()>,
    /// Bumped after every completed refresh, so callers that queued behind
    /// an in-flight refresh can adopt its result
    refresh_generation: AtomicU64,
}

/// Cached, change-aware access to one JSON document in a blob store
///
/// Cloning is cheap and every clone drives the same underlying cache,
/// listener set, and timer.
#[derive(Clone)]
pub struct Poller {
    inner: Arc<PollerInner>,
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller").finish_non_exhaustive()
    }
}

impl Poller {
    /// Starts building a poller for the document at `bucket`/`key`
    pub fn builder(
        store: Arc<dyn BlobStore>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> PollerBuilder {
        PollerBuilder::new(store, bucket, key)
    }

    /// Returns the cached value, fetching it first if the cache is empty
    ///
    /// With a populated cache this never touches the store.
    pub async fn get_object(&self) -> Result<Arc<Value>, PollError> {
        if let Some(value) = self.current_value() {
            return Ok(value);
        }
        self.get_update().await
    }

    /// Returns the cached value without ever triggering a fetch
    pub fn current_value(&self) -> Option<Arc<Value>> {
        self.inner.cache.lock().unwrap().current()
    }

    /// Returns the cached last-modified marker, if any
    pub fn last_modified(&self) -> Option<Marker> {
        self.inner.cache.lock().unwrap().last_modified()
    }

    /// Checks the store for a newer version of the document
    ///
    /// When the cache holds both a value and a marker the check is
    /// conditional; otherwise the document is fetched unconditionally. On a
    /// confirmed change the cache is updated and every registered listener
    /// is invoked with the new value before this call resolves. On a
    /// not-modified outcome the previously cached value is returned
    /// untouched and no listener fires.
    ///
    /// Failures leave the cache as it was and are returned to the caller;
    /// refreshes driven by [`poll`](Self::poll) discard them instead.
    pub async fn get_update(&self) -> Result<Arc<Value>, PollError> {
        let entered_at = self.inner.refresh_generation.load(Ordering::Acquire);
        let _gate = self.inner.refresh_gate.lock().await;

        if self.inner.refresh_generation.load(Ordering::Acquire) != entered_at {
            // A refresh completed while we waited for the gate; its result
            // is already in the cache.
            if let Some(value) = self.current_value() {
                debug!("adopting result of concurrent refresh");
                return Ok(value);
            }
        }

        self.refresh().await
    }

    /// Runs one refresh cycle; the caller must hold the refresh gate
    async fn refresh(&self) -> Result<Arc<Value>, PollError> {
        let (cached_value, conditional_marker) = {
            let cache = self.inner.cache.lock().unwrap();
            (cache.current(), cache.conditional_marker())
        };

        match self
            .inner
            .fetcher
            .fetch(conditional_marker.as_ref())
            .await?
        {
            FetchOutcome::Changed { value, marker } => {
                self.inner
                    .cache
                    .lock()
                    .unwrap()
                    .apply_changed(value.clone(), marker);
                self.inner
                    .refresh_generation
                    .fetch_add(1, Ordering::AcqRel);

                // Snapshot outside the lock so a listener may re-enter the
                // registry (e.g. remove itself) without deadlocking.
                let snapshot = self.inner.listeners.lock().unwrap().snapshot();
                for listener in snapshot {
                    listener(value.clone());
                }

                Ok(value)
            }
            FetchOutcome::NotModified => {
                self.inner
                    .refresh_generation
                    .fetch_add(1, Ordering::AcqRel);
                match cached_value {
                    Some(value) => Ok(value),
                    // The fetcher rejects unconditional not-modified
                    // responses, so the cache is populated here.
                    None => Err(StoreError::UnexpectedNotModified.into()),
                }
            }
        }
    }

    /// (Re)starts periodic refreshing at the given interval
    ///
    /// Any previously started timer is replaced; this instance never runs
    /// more than one. Refresh failures are swallowed by the scheduler.
    pub fn poll(&self, interval: Duration) -> &Self {
        let weak = Arc::downgrade(&self.inner);
        self.inner
            .scheduler
            .lock()
            .unwrap()
            .start(interval, move || {
                let weak = weak.clone();
                async move {
                    match weak.upgrade() {
                        Some(inner) => Poller { inner }.get_update().await.map(|_| ()),
                        // Poller dropped; the timer is being torn down.
                        None => Ok(()),
                    }
                }
            });
        self
    }

    /// Stops periodic refreshing; listeners stay registered
    ///
    /// A refresh already in flight completes normally; only future ticks
    /// are prevented.
    pub fn cancel_poll(&self) -> &Self {
        self.inner.scheduler.lock().unwrap().stop();
        self
    }

    /// Whether a poll timer is currently running
    pub fn is_polling(&self) -> bool {
        self.inner.scheduler.lock().unwrap().is_active()
    }

    /// Registers listeners to be called on every confirmed change
    pub fn on_update(&self, listeners: impl IntoIterator<Item = UpdateListener>) -> &Self {
        self.inner.listeners.lock().unwrap().add(listeners);
        self
    }

    /// Removes previously registered listeners by handle identity
    pub fn off_update<'a>(
        &self,
        listeners: impl IntoIterator<Item = &'a UpdateListener>,
    ) -> &Self {
        self.inner.listeners.lock().unwrap().remove(listeners);
        self
    }

    /// Removes all registered listeners
    pub fn remove_listeners(&self) -> &Self {
        self.inner.listeners.lock().unwrap().clear();
        self
    }

    /// Number of currently registered listeners
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().unwrap().len()
    }
}

/// Builder for [`Poller`]
///
/// Bucket and key are required and must be non-empty; everything else is
/// optional. Supplying an interval starts the poll timer immediately on
/// `build`.
pub struct PollerBuilder {
    store: Arc<dyn BlobStore>,
    bucket: String,
    key: String,
    initial_value: Option<Value>,
    initial_last_modified: Option<String>,
    listeners: Vec<UpdateListener>,
    interval: Option<Duration>,
}

impl PollerBuilder {
    pub fn new(
        store: Arc<dyn BlobStore>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            key: key.into(),
            initial_value: None,
            initial_last_modified: None,
            listeners: Vec::new(),
            interval: None,
        }
    }

    /// Pre-populates the cache with a known document value
    pub fn initial_value(mut self, value: Value) -> Self {
        self.initial_value = Some(value);
        self
    }

    /// Pre-populates the cache with a known last-modified marker
    ///
    /// Must be a well-formed HTTP date; validated on `build`.
    pub fn initial_last_modified(mut self, marker: impl Into<String>) -> Self {
        self.initial_last_modified = Some(marker.into());
        self
    }

    /// Registers a listener before the first refresh can fire
    pub fn listener(mut self, listener: UpdateListener) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Starts periodic refreshing at this interval as soon as the poller
    /// is built
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Validates the configuration and builds the poller
    ///
    /// # Returns
    /// * `Ok(Poller)` on success
    /// * `Err(ConfigError)` if bucket or key is empty, or the initial
    ///   marker is not a well-formed HTTP date
    pub fn build(self) -> Result<Poller, ConfigError> {
        if self.bucket.is_empty() {
            return Err(ConfigError::EmptyBucket);
        }
        if self.key.is_empty() {
            return Err(ConfigError::EmptyKey);
        }
        let initial_marker = self
            .initial_last_modified
            .as_deref()
            .map(Marker::parse)
            .transpose()?;

        let mut registry = ListenerRegistry::new();
        registry.add(self.listeners);

        let poller = Poller {
            inner: Arc::new(PollerInner {
                fetcher: ConditionalFetcher::new(self.store, self.bucket, self.key),
                cache: Mutex::new(ObjectCache::prepopulated(self.initial_value, initial_marker)),
                listeners: Mutex::new(registry),
                scheduler: Mutex::new(PollScheduler::new()),
                refresh_gate: AsyncMutex::new(()),
                refresh_generation: AtomicU64::new(0),
            }),
        };

        if let Some(interval) = self.interval {
            poller.poll(interval);
        }

        Ok(poller)
    }
}
