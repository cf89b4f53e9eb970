//! Poll scheduler
//!
//! Drives periodic refresh attempts through a single repeating tokio task.
//! Starting the scheduler replaces any timer that is already running, so an
//! instance never has more than one timer ticking at a time. Failures from
//! the refresh function are discarded; polling degrades silently and simply
//! tries again on the next tick.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// A running repeating timer
struct ScheduledTask {
    /// Signals the task to exit before its next tick
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        // Stop ticking once the owner is gone. The task checks shutdown
        // before the next tick, so a refresh already in flight completes.
        let _ = self.shutdown_tx.try_send(());
    }
}

/// Manages the single repeating timer of one poller instance
#[derive(Default)]
pub struct PollScheduler {
    active: Option<ScheduledTask>,
}

impl PollScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a repeating timer that invokes `refresh` on every tick
    ///
    /// Any previously installed timer is cancelled first. The first tick
    /// fires one full interval after installation, not immediately. Errors
    /// returned by `refresh` are logged at debug level and otherwise
    /// dropped.
    pub fn start<F, Fut, T, E>(&mut self, interval: Duration, refresh: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: Display + Send,
    {
        self.stop();

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // Skip the first tick (immediate)
            ticker.tick().await;

            loop {
                tokio::select! {
                    // Shutdown wins over a tick that became ready at the
                    // same moment: no refresh starts after stop().
                    biased;
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = refresh().await {
                            debug!(error = %e, "scheduled refresh failed; retrying on next tick");
                        }
                    }
                }
            }
        });

        self.active = Some(ScheduledTask {
            shutdown_tx,
            handle,
        });
    }

    /// Cancels the active timer, if any; idempotent
    ///
    /// A refresh already in flight is neither cancelled nor awaited; only
    /// future ticks are prevented.
    pub fn stop(&mut self) {
        // Dropping the task sends the shutdown signal.
        self.active.take();
    }

    /// Whether a timer is currently installed and its task still running
    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }
}
