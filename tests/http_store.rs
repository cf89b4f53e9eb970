//! Integration tests for the HTTP blob store client
//!
//! Runs `HttpBlobStore` against a local mockito server to check the
//! conditional-fetch wire convention: `If-Modified-Since` on conditional
//! requests, `304` mapping to the not-modified signal, and `Last-Modified`
//! captured as the marker.

use std::sync::Arc;

use mockito::Matcher;
use serde_json::json;

use blobwatch::error::StoreError;
use blobwatch::marker::Marker;
use blobwatch::poller::Poller;
use blobwatch::store::{BlobStore, HttpBlobStore, StoreResponse};

const T1: &str = "Tue, 15 Nov 1994 12:45:26 GMT";

#[tokio::test]
async fn test_unconditional_get_returns_body_and_marker() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/configs/app.json")
        .match_header("if-modified-since", Matcher::Missing)
        .with_status(200)
        .with_header("last-modified", T1)
        .with_body(r#"{"a":1}"#)
        .create_async()
        .await;

    let store = HttpBlobStore::new(server.url());
    let response = store.get("configs", "app.json", None).await.expect("request succeeds");

    match response {
        StoreResponse::Body {
            bytes,
            last_modified,
        } => {
            assert_eq!(bytes, br#"{"a":1}"#.to_vec());
            assert_eq!(last_modified, Some(Marker::from_store(T1)));
        }
        other => panic!("expected Body, got {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_conditional_get_sends_if_modified_since() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/configs/app.json")
        .match_header("if-modified-since", T1)
        .with_status(304)
        .create_async()
        .await;

    let store = HttpBlobStore::new(server.url());
    let marker = Marker::from_store(T1);
    let response = store
        .get("configs", "app.json", Some(&marker))
        .await
        .expect("request succeeds");

    assert!(matches!(response, StoreResponse::NotModified));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_last_modified_yields_no_marker() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/configs/app.json")
        .with_status(200)
        .with_body("42")
        .create_async()
        .await;

    let store = HttpBlobStore::new(server.url());
    let response = store.get("configs", "app.json", None).await.expect("request succeeds");

    match response {
        StoreResponse::Body { last_modified, .. } => assert!(last_modified.is_none()),
        other => panic!("expected Body, got {:?}", other),
    }
}

#[tokio::test]
async fn test_not_found_maps_to_status_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/configs/missing.json")
        .with_status(404)
        .create_async()
        .await;

    let store = HttpBlobStore::new(server.url());
    let err = store.get("configs", "missing.json", None).await.unwrap_err();

    assert!(matches!(err, StoreError::Status(404)));
}

#[tokio::test]
async fn test_poller_over_http_caches_and_revalidates() {
    let mut server = mockito::Server::new_async().await;
    let first = server
        .mock("GET", "/configs/app.json")
        .match_header("if-modified-since", Matcher::Missing)
        .with_status(200)
        .with_header("last-modified", T1)
        .with_body(r#"{"a":1}"#)
        .create_async()
        .await;
    let revalidate = server
        .mock("GET", "/configs/app.json")
        .match_header("if-modified-since", T1)
        .with_status(304)
        .create_async()
        .await;

    let store = Arc::new(HttpBlobStore::new(server.url()));
    let poller = Poller::builder(store, "configs", "app.json")
        .build()
        .expect("valid config");

    let fetched = poller.get_object().await.expect("first fetch");
    assert_eq!(*fetched, json!({"a": 1}));
    assert_eq!(poller.last_modified(), Some(Marker::from_store(T1)));

    let unchanged = poller.get_update().await.expect("revalidation");
    assert!(Arc::ptr_eq(&fetched, &unchanged));

    first.assert_async().await;
    revalidate.assert_async().await;
}
