//! Conditional fetch protocol
//!
//! Performs one remote fetch attempt against the blob store and classifies
//! the result: either the document changed (with its new marker), or the
//! store confirmed it is unchanged since the supplied marker. Everything
//! else is an error.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::{PollError, StoreError};
use crate::marker::Marker;
use crate::store::{BlobStore, StoreResponse};

/// Classification of a successful fetch attempt
#[derive(Debug)]
pub enum FetchOutcome {
    /// The store returned a full body that parsed as JSON
    Changed {
        /// The freshly parsed document
        value: Arc<Value>,
        /// The store's marker for this body, if it sent one
        marker: Option<Marker>,
    },
    /// The store confirmed no change since the supplied marker; only
    /// possible for conditional fetches
    NotModified,
}

/// Fetches one configured document from the store and classifies the result
pub struct ConditionalFetcher {
    store: Arc<dyn BlobStore>,
    bucket: String,
    key: String,
}

impl ConditionalFetcher {
    /// Creates a fetcher bound to one bucket/key pair
    pub fn new(store: Arc<dyn BlobStore>, bucket: String, key: String) -> Self {
        Self { store, bucket, key }
    }

    /// Performs one fetch attempt
    ///
    /// Passing `if_modified_since` makes the request conditional; without it
    /// the request is unconditional and can never classify as
    /// [`FetchOutcome::NotModified`].
    ///
    /// # Returns
    /// * `Ok(FetchOutcome::Changed)` - the store sent a body and it parsed as JSON
    /// * `Ok(FetchOutcome::NotModified)` - the store confirmed no change
    /// * `Err(PollError::Parse)` - the store sent a body that is not valid JSON
    /// * `Err(PollError::Fetch)` - any other failure
    pub async fn fetch(
        &self,
        if_modified_since: Option<&Marker>,
    ) -> Result<FetchOutcome, PollError> {
        let conditional = if_modified_since.is_some();
        let response = self
            .store
            .get(&self.bucket, &self.key, if_modified_since)
            .await?;

        match response {
            StoreResponse::NotModified if conditional => {
                debug!(bucket = %self.bucket, key = %self.key, "object not modified");
                Ok(FetchOutcome::NotModified)
            }
            // A not-modified signal without a conditional request is a store
            // protocol violation, not a valid outcome.
            StoreResponse::NotModified => Err(StoreError::UnexpectedNotModified.into()),
            StoreResponse::Body {
                bytes,
                last_modified,
            } => {
                let value: Value = serde_json::from_slice(&bytes)?;
                debug!(
                    bucket = %self.bucket,
                    key = %self.key,
                    marker = last_modified.as_ref().map(Marker::as_str),
                    "object changed"
                );
                Ok(FetchOutcome::Changed {
                    value: Arc::new(value),
                    marker: last_modified,
                })
            }
        }
    }
}
