//! Periodic background refresh
//!
//! Runs [`Tree::refresh`] on a fixed schedule from a dedicated thread. The
//! single thread guarantees passes never overlap, and the handle carries an
//! explicit stop signal so shutdown paths and tests can cancel the task
//! deterministically instead of leaking it for the process lifetime.

use super::Tree;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Handle to a running periodic refresh task.
///
/// Dropping the handle stops the task and joins the thread.
pub struct RefreshHandle {
    stop_tx: Option<mpsc::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl RefreshHandle {
    /// Stop the background task and wait for the in-flight pass, if any, to
    /// finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            // The receiver may already be gone if the thread exited.
            let _ = stop_tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("periodic refresh thread panicked");
            }
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Tree {
    /// Start refreshing this tree every `interval` until the returned handle
    /// is stopped or dropped.
    ///
    /// Refresh failures are logged and never stop the schedule; the cache
    /// keeps serving its last-known state between passes.
    pub fn start_periodic_refresh(self: &Arc<Self>, interval: Duration) -> RefreshHandle {
        let tree = Arc::clone(self);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let thread = thread::spawn(move || {
            info!(interval_ms = interval.as_millis() as u64, "periodic refresh started");
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        if let Err(e) = tree.refresh() {
                            warn!(error = %e, "scheduled refresh pass failed");
                        }
                    }
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!("periodic refresh stopped");
        });
        RefreshHandle {
            stop_tx: Some(stop_tx),
            thread: Some(thread),
        }
    }
}
