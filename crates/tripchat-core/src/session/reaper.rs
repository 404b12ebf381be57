//! Background eviction of idle sessions.
//!
//! `SessionReaper` owns a tokio task that calls
//! [`SessionStore::sweep_expired`] on a fixed interval. It goes through the
//! store's normal API, so it follows the same per-shard locking as request
//! handlers. Lifecycle is explicit: the composition root calls
//! [`SessionReaper::start`] at boot and [`SessionReaper::stop`] on shutdown.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::store::SessionStore;

/// Handle to a running reaper task.
///
/// Dropping the handle cancels the task without waiting for it.
pub struct SessionReaper {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl SessionReaper {
    /// Spawn the reaper on the current tokio runtime.
    ///
    /// The first sweep runs one full `interval` after start.
    pub fn start(store: Arc<SessionStore>, interval: Duration, ttl: Duration) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!("session reaper cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        let evicted = store.sweep_expired(Utc::now(), ttl);
                        if evicted > 0 {
                            info!(evicted, remaining = store.len(), "evicted idle sessions");
                        } else {
                            debug!(remaining = store.len(), "session sweep found nothing to evict");
                        }
                    }
                }
            }
        });

        info!(interval_secs = interval.as_secs(), ttl_secs = ttl.as_secs(), "session reaper started");

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Whether the background task is still running.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel the task and wait for it to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "session reaper task ended abnormally");
            }
        }
        info!("session reaper stopped");
    }
}

impl Drop for SessionReaper {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
