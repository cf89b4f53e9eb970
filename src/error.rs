//! Error types for blobwatch
//!
//! Each concern gets its own error enum: configuration problems are caught at
//! construction time, remote failures come from the store client, and refresh
//! failures are what callers of `get_object`/`get_update` see.

use thiserror::Error;

/// Errors raised when constructing a [`Poller`](crate::Poller)
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Bucket identifier was empty
    #[error("bucket must be a non-empty identifier")]
    EmptyBucket,

    /// Object key was empty
    #[error("key must be a non-empty identifier")]
    EmptyKey,

    /// Initial last-modified marker is not a well-formed HTTP date
    #[error("initial last-modified marker is not a valid HTTP date: '{0}'")]
    InvalidMarker(String),
}

/// Errors returned by a blob store client
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Store answered with a non-success status
    #[error("store returned HTTP status {0}")]
    Status(u16),

    /// Store signaled not-modified although no conditional marker was sent
    #[error("store signaled not-modified for an unconditional request")]
    UnexpectedNotModified,
}

/// Errors surfaced from a refresh cycle
///
/// Manual callers of `get_object`/`get_update` always see these; refreshes
/// driven by the poll scheduler discard them and retry on the next tick.
#[derive(Debug, Error)]
pub enum PollError {
    /// The remote fetch failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] StoreError),

    /// The fetched body is not a valid JSON document
    #[error("fetched body is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
