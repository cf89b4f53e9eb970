//! In-memory object cache
//!
//! Pure state holder for the current document value and its last-known
//! modification marker. All decisions about when and how to mutate it live
//! in the poller; the cache only enforces that value and marker move
//! together on a confirmed change.

use std::sync::Arc;

use serde_json::Value;

use crate::marker::Marker;

/// Cached document state for one poller instance
#[derive(Debug, Default)]
pub struct ObjectCache {
    /// Current parsed document, absent until the first successful fetch
    value: Option<Arc<Value>>,
    /// Marker the store attached to the current value
    last_modified: Option<Marker>,
}

impl ObjectCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache pre-populated from construction-time configuration
    pub fn prepopulated(value: Option<Value>, last_modified: Option<Marker>) -> Self {
        Self {
            value: value.map(Arc::new),
            last_modified,
        }
    }

    /// Returns the cached value, if any
    pub fn current(&self) -> Option<Arc<Value>> {
        self.value.clone()
    }

    /// Returns the cached marker, if any
    pub fn last_modified(&self) -> Option<Marker> {
        self.last_modified.clone()
    }

    /// Returns the marker to use for a conditional fetch
    ///
    /// A request may only be conditional when both the value and the marker
    /// are present; a marker without a value (or vice versa) forces an
    /// unconditional fetch.
    pub fn conditional_marker(&self) -> Option<Marker> {
        match (&self.value, &self.last_modified) {
            (Some(_), Some(marker)) => Some(marker.clone()),
            _ => None,
        }
    }

    /// Overwrites both fields after a fetch classified as changed
    ///
    /// This is the only mutation the cache supports: not-modified and failed
    /// outcomes leave it untouched.
    pub fn apply_changed(&mut self, value: Arc<Value>, last_modified: Option<Marker>) {
        self.value = Some(value);
        self.last_modified = last_modified;
    }
}
