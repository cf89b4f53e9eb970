//! HTTP blob store client
//!
//! Speaks the S3-style HTTP object convention: objects live at
//! `{endpoint}/{bucket}/{key}`, conditional fetches send `If-Modified-Since`,
//! and the store answers `304 Not Modified` when the object is unchanged.

use async_trait::async_trait;
use reqwest::header::{IF_MODIFIED_SINCE, LAST_MODIFIED};
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::{BlobStore, StoreResponse};
use crate::error::StoreError;
use crate::marker::Marker;

/// Blob store client backed by an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    /// HTTP client for making requests
    client: Client,
    /// Base URL of the store endpoint, without a trailing slash
    endpoint: String,
}

impl HttpBlobStore {
    /// Creates a new client for the given endpoint URL
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, Client::new())
    }

    /// Creates a new client with a caller-supplied HTTP client
    ///
    /// Useful when the caller needs custom timeouts, proxies, or TLS
    /// settings on the underlying `reqwest::Client`.
    pub fn with_client(endpoint: impl Into<String>, client: Client) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self { client, endpoint }
    }

    /// Builds the object URL for a bucket/key pair
    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, bucket, key)
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn get(
        &self,
        bucket: &str,
        key: &str,
        if_modified_since: Option<&Marker>,
    ) -> Result<StoreResponse, StoreError> {
        let url = self.object_url(bucket, key);
        let mut request = self.client.get(&url);
        if let Some(marker) = if_modified_since {
            request = request.header(IF_MODIFIED_SINCE, marker.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(%url, %status, conditional = if_modified_since.is_some(), "store request");

        if status == StatusCode::NOT_MODIFIED {
            Ok(StoreResponse::NotModified)
        } else if status.is_success() {
            let last_modified = response
                .headers()
                .get(LAST_MODIFIED)
                .and_then(|v| v.to_str().ok())
                .map(Marker::from_store);
            let bytes = response.bytes().await?.to_vec();
            Ok(StoreResponse::Body {
                bytes,
                last_modified,
            })
        } else {
            Err(StoreError::Status(status.as_u16()))
        }
    }
}
