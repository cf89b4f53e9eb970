//! Command-line interface for the blobwatch binary
//!
//! Parses the store endpoint, document coordinates, and polling options
//! using clap.

use clap::Parser;
use std::time::Duration;

/// Watch a JSON document in a remote blob store and print it on change
#[derive(Parser, Debug)]
#[command(name = "blobwatch")]
#[command(about = "Cached, change-aware polling of a JSON document in a blob store")]
#[command(version)]
pub struct Cli {
    /// Base URL of the blob store endpoint (objects at {endpoint}/{bucket}/{key})
    pub endpoint: String,

    /// Bucket holding the document
    pub bucket: String,

    /// Object key of the JSON document
    pub key: String,

    /// Re-check interval in seconds; omit to fetch once and exit
    #[arg(long, value_name = "SECONDS")]
    pub interval: Option<u64>,

    /// Known last-modified marker to make even the first check conditional
    ///
    /// Must be an HTTP date, e.g. "Tue, 15 Nov 1994 12:45:26 GMT".
    /// Requires --initial-value so the first check can be conditional.
    #[arg(long, value_name = "HTTP_DATE", requires = "initial_value")]
    pub last_modified: Option<String>,

    /// Known document value matching --last-modified, as inline JSON
    #[arg(long, value_name = "JSON")]
    pub initial_value: Option<String>,
}

impl Cli {
    /// Returns the poll interval as a `Duration`, if one was requested
    pub fn poll_interval(&self) -> Option<Duration> {
        self.interval.map(Duration::from_secs)
    }
}
