//! Detects collection changes written by other processes.
//!
//! Processes sharing a [`FileBackend`] directory behave like browser tabs
//! sharing one profile: a write in one must reach views in the others.
//! The watcher polls each collection file, compares content fingerprints
//! and publishes an `External` change for every difference this process
//! did not write itself.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::FileBackend;
use crate::domain::Collection;
use crate::notifications::{ChangeEvent, SharedChangeNotifier};
use crate::shared::ShutdownSignal;

pub struct StoreWatcher {
    backend: Arc<FileBackend>,
    notifier: SharedChangeNotifier,
    interval: Duration,
    seen: HashMap<Collection, Option<String>>,
}

impl StoreWatcher {
    /// Snapshot the current state of every collection; only changes after
    /// this point are reported.
    pub fn new(backend: Arc<FileBackend>, notifier: SharedChangeNotifier, interval: Duration) -> Self {
        let seen = Collection::ALL
            .into_iter()
            .map(|c| (c, backend.current_fingerprint(c.storage_key()).ok().flatten()))
            .collect();
        Self {
            backend,
            notifier,
            interval,
            seen,
        }
    }

    /// Check every collection once. Returns the collections that changed
    /// externally; an event has been published for each.
    pub fn poll_once(&mut self) -> Vec<Collection> {
        let mut changed = Vec::new();

        for collection in Collection::ALL {
            let key = collection.storage_key();
            let current = match self.backend.current_fingerprint(key) {
                Ok(fp) => fp,
                Err(e) => {
                    warn!(key, error = %e, "Failed to fingerprint collection");
                    continue;
                }
            };

            let previous = self.seen.insert(collection, current.clone()).flatten();
            if previous == current {
                continue;
            }
            if self.backend.last_written(key) == Some(current) {
                debug!(collection = %collection, "Skipping own write");
                continue;
            }

            info!(collection = %collection, "External change detected");
            self.notifier.publish(ChangeEvent::external(collection));
            changed.push(collection);
        }

        changed
    }

    /// Poll until `shutdown` fires.
    pub fn spawn(mut self, shutdown: ShutdownSignal) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval_ms = self.interval.as_millis() as u64, "Store watcher started");
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.wait() => break,
                    _ = ticker.tick() => {
                        self.poll_once();
                    }
                }
            }
            info!("Store watcher stopped");
        })
    }
}
