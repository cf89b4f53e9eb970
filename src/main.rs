//! blobwatch - watch a JSON document in a remote blob store
//!
//! Fetches the document once, or keeps polling it at an interval, printing
//! the parsed value to stdout whenever the store reports a change.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use blobwatch::cli::Cli;
use blobwatch::{listener, HttpBlobStore, Poller};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let store = Arc::new(HttpBlobStore::new(&cli.endpoint));
    let mut builder = Poller::builder(store, &cli.bucket, &cli.key);

    if let Some(raw) = &cli.initial_value {
        builder = builder.initial_value(serde_json::from_str(raw)?);
    }
    if let Some(marker) = &cli.last_modified {
        builder = builder.initial_last_modified(marker.clone());
    }

    let poller = builder.build()?;

    match cli.poll_interval() {
        None => {
            // One-shot: fetch (or reuse the supplied initial value) and print.
            let value = poller.get_object().await?;
            println!("{}", serde_json::to_string_pretty(&*value)?);
        }
        Some(interval) => {
            poller.on_update([listener(|value| {
                match serde_json::to_string_pretty(&*value) {
                    Ok(pretty) => println!("{}", pretty),
                    Err(e) => eprintln!("failed to render document: {}", e),
                }
            })]);

            // Print the current state once, then let the timer take over.
            let value = poller.get_object().await?;
            println!("{}", serde_json::to_string_pretty(&*value)?);

            poller.poll(interval);
            tokio::signal::ctrl_c().await?;
            poller.cancel_poll();
        }
    }

    Ok(())
}
