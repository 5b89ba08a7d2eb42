//! Background sweep of expired entries
//!
//! Lazy deletion on read only catches keys that are read again. The reclaimer
//! bounds how long an abandoned, expired entry can occupy memory to one
//! interval.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::store::Store;

/// Handle to the running reclaimer task
///
/// Dropping the handle signals the task to stop; use [`Reclaimer::shutdown`] to
/// also wait for it and observe a panic.
#[derive(Debug)]
pub struct Reclaimer {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Reclaimer {
    /// Spawn the sweep loop on the current tokio runtime
    ///
    /// The first sweep happens one `interval` after spawning.
    ///
    /// # Panics
    /// Panics if `interval` is zero or if called outside a tokio runtime. Use
    /// [`StoreConfig::validate`](crate::StoreConfig::validate) to check the
    /// interval first.
    pub fn spawn(store: Arc<Store>, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run(store, interval, shutdown_rx));

        info!(interval_ms = interval.as_millis() as u64, "Reclaimer started");
        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Whether the task has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task to exit without asking it to
    ///
    /// The loop only exits on shutdown, so in a running daemon this resolves
    /// only if the task died. Cancel-safe; do not call again once it resolved.
    pub async fn stopped(&mut self) -> Result<()> {
        join_result((&mut self.handle).await)
    }

    /// Stop the loop and wait for it to exit
    ///
    /// # Returns
    /// * `Err(Error::ReclaimerPanicked)` if the task died from a panic
    pub async fn shutdown(self) -> Result<()> {
        // Receiver may already be gone if the task died; that is reported below
        let _ = self.shutdown_tx.send(true);

        join_result(self.handle.await)?;
        info!("Reclaimer stopped");
        Ok(())
    }
}

fn join_result(res: std::result::Result<(), JoinError>) -> Result<()> {
    match res {
        Ok(()) => Ok(()),
        Err(e) if e.is_panic() => Err(Error::ReclaimerPanicked(panic_message(e.into_panic()))),
        Err(e) => Err(Error::ReclaimerPanicked(e.to_string())),
    }
}

async fn run(store: Arc<Store>, interval: Duration, mut shutdown_rx: watch::Receiver<bool>) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = store.sweep();
                debug!(
                    removed,
                    remaining = store.len(),
                    total_reclaimed = store.stats().reclaimed(),
                    "Sweep complete"
                );
            }
            changed = shutdown_rx.changed() => {
                // Err: sender dropped along with the handle
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreConfig;

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_abandoned_entry() {
        let store = Arc::new(Store::new());
        let reclaimer = Reclaimer::spawn(Arc::clone(&store), Duration::from_secs(10));

        store.set("abandoned", "v", 1);
        store.set("kept", "v", 0);
        assert_eq!(store.len(), 2);

        // Past one interval, with no reads in between
        time::sleep(Duration::from_secs(11)).await;

        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().reclaimed(), 1);
        assert_eq!(store.stats().lazy_expirations(), 0);

        reclaimer.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_sweep_before_first_interval() {
        let store = Arc::new(Store::new());
        let reclaimer = Reclaimer::spawn(Arc::clone(&store), Duration::from_secs(10));

        store.set("k", "v", 1);
        time::sleep(Duration::from_secs(5)).await;

        // Expired but not yet reclaimed
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().sweeps(), 0);

        reclaimer.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeps_repeat() {
        let store = Arc::new(Store::new());
        let config = StoreConfig::default();
        let reclaimer = Reclaimer::spawn(Arc::clone(&store), config.reclaim_interval);

        time::sleep(Duration::from_secs(35)).await;
        assert_eq!(store.stats().sweeps(), 3);

        reclaimer.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_task() {
        let store = Arc::new(Store::new());
        let reclaimer = Reclaimer::spawn(Arc::clone(&store), Duration::from_secs(1));

        assert!(!reclaimer.is_finished());
        reclaimer.shutdown().await.unwrap();

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.stats().sweeps(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_task() {
        let store = Arc::new(Store::new());
        let reclaimer = Reclaimer::spawn(Arc::clone(&store), Duration::from_secs(1));
        drop(reclaimer);

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.stats().sweeps(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_pending_while_running() {
        let store = Arc::new(Store::new());
        let mut reclaimer = Reclaimer::spawn(Arc::clone(&store), Duration::from_secs(1));

        let waited = time::timeout(Duration::from_secs(30), reclaimer.stopped()).await;
        assert!(waited.is_err());
        assert!(store.stats().sweeps() >= 29);

        reclaimer.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_join_result_reports_panic() {
        let res = tokio::spawn(async { panic!("sweep invariant broken") }).await;

        match join_result(res) {
            Err(Error::ReclaimerPanicked(msg)) => assert_eq!(msg, "sweep invariant broken"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new("boom".to_string())), "boom");
        assert_eq!(panic_message(Box::new(7u8)), "unknown panic payload");
    }
}
