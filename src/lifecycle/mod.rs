//! Process lifetime policy.
//!
//! Every way the relay can stop funnels into one watch channel: the last
//! connection closing in idle-shutdown mode, the max-lifetime watchdog, or
//! an interrupt signal. The accept loop and every connection task observe
//! the same signal, so teardown is a single broadcast rather than a
//! per-task negotiation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{info, warn};

use crate::relay::Relay;

#[derive(Debug)]
pub struct Lifecycle {
    persistent: bool,
    shutdown: watch::Sender<bool>,
}

impl Lifecycle {
    pub fn new(persistent: bool) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            persistent,
            shutdown,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// A receiver for the shutdown signal. A receiver taken after the signal
    /// fired still observes it.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Re-evaluates the idle policy after a connection closed. In
    /// idle-shutdown mode, reaching zero open connections stops the relay.
    pub fn client_closed(&self, remaining: usize) {
        if !self.persistent && remaining == 0 {
            info!("last connection closed, shutting down");
            self.shutdown.send_replace(true);
        }
    }

    /// Fires the shutdown signal unconditionally.
    pub fn shutdown_now(&self) {
        self.shutdown.send_replace(true);
    }

    /// Resolves once the shutdown signal has fired.
    pub async fn wait_for_shutdown(&self) {
        let mut rx = self.subscribe();
        let _ = rx.wait_for(|stop| *stop).await;
    }
}

/// Hard cap on process lifetime. After `limit`, every connection is closed
/// and the shutdown signal fires, regardless of activity or mode.
pub async fn enforce_max_lifetime(
    limit: Duration,
    relay: Arc<Mutex<Relay>>,
    lifecycle: Arc<Lifecycle>,
) {
    time::sleep(limit).await;
    warn!("max lifetime of {limit:?} reached, shutting down");
    relay.lock().unwrap().close_all();
    lifecycle.shutdown_now();
}
