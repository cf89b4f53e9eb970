//! blobwatch - cached, change-aware access to a JSON document in a blob store
//!
//! A [`Poller`] fetches one remote JSON document on first access, caches it
//! in memory, and re-checks the store for changes conditionally so an
//! unchanged document is never re-downloaded. Confirmed changes update the
//! cache and notify registered listeners; periodic re-checking is available
//! through [`Poller::poll`].

pub mod cache;
pub mod cli;
pub mod error;
pub mod fetch;
pub mod listener;
pub mod marker;
pub mod poller;
pub mod schedule;
pub mod store;

pub use error::{ConfigError, PollError, StoreError};
pub use listener::{listener, UpdateListener};
pub use marker::Marker;
pub use poller::{Poller, PollerBuilder};
pub use store::{BlobStore, HttpBlobStore, StoreResponse};
