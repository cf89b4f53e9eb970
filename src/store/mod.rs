//! Blob store clients
//!
//! The poller talks to the remote store through the [`BlobStore`] trait so
//! that tests can substitute a scripted in-memory store. [`HttpBlobStore`]
//! is the production implementation speaking the common S3-style HTTP
//! convention.

pub mod http;

pub use http::HttpBlobStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::marker::Marker;

/// Outcome of a single get-object request against the store
#[derive(Debug)]
pub enum StoreResponse {
    /// The store returned the current object body
    Body {
        /// Raw object bytes; expected to be UTF-8 JSON but not validated here
        bytes: Vec<u8>,
        /// The store's last-modified marker for this body, if it sent one
        last_modified: Option<Marker>,
    },
    /// The store signaled that the object has not changed since the
    /// supplied marker
    NotModified,
}

/// Capability to fetch one object from a remote key-value blob store
///
/// `if_modified_since` turns the request conditional: when the store still
/// holds the same version it answers with [`StoreResponse::NotModified`]
/// instead of re-sending the body. Implementations must never answer
/// `NotModified` to an unconditional request.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetches the object at `bucket`/`key`, optionally conditional on
    /// `if_modified_since`
    async fn get(
        &self,
        bucket: &str,
        key: &str,
        if_modified_since: Option<&Marker>,
    ) -> Result<StoreResponse, StoreError>;
}
