//! Shutdown Coordination
//!
//! Turns SIGINT/SIGTERM/SIGHUP (or Ctrl-C elsewhere) into a broadcast that
//! long-running loops such as the job consumer select on. A second signal
//! exits the process immediately.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Exit status used when a second signal forces the process down
const FORCED_EXIT_CODE: i32 = 130;

/// Coordinates graceful shutdown across the application
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
    signals_seen: Arc<AtomicUsize>,
}

impl ShutdownCoordinator {
    pub fn new() -> (Self, broadcast::Receiver<()>) {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(8);
        let coordinator = Self {
            shutdown_tx,
            signals_seen: Arc::new(AtomicUsize::new(0)),
        };
        (coordinator, shutdown_rx)
    }

    /// Run `future_fn` with signal handlers installed
    ///
    /// The closure receives the shutdown receiver and decides itself where it
    /// is safe to stop.
    pub async fn guard<F, Fut, R>(future_fn: F) -> R
    where
        F: FnOnce(broadcast::Receiver<()>) -> Fut,
        Fut: std::future::Future<Output = R>,
    {
        let (coordinator, shutdown_rx) = Self::new();
        coordinator.install_signal_handlers();
        future_fn(shutdown_rx).await
    }

    fn install_signal_handlers(&self) {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            // Piping output into `head` should end the process quietly
            unsafe {
                libc::signal(libc::SIGPIPE, libc::SIG_DFL);
            }

            for kind in [
                SignalKind::interrupt(),
                SignalKind::terminate(),
                SignalKind::hangup(),
            ] {
                let handle = self.handle();
                tokio::spawn(async move {
                    if let Ok(mut sig) = signal(kind) {
                        while sig.recv().await.is_some() {
                            handle.signal_received();
                        }
                    }
                });
            }
        }

        #[cfg(not(unix))]
        {
            let handle = self.handle();
            tokio::spawn(async move {
                while tokio::signal::ctrl_c().await.is_ok() {
                    handle.signal_received();
                }
            });
        }
    }

    fn handle(&self) -> SignalHandle {
        SignalHandle {
            shutdown_tx: self.shutdown_tx.clone(),
            signals_seen: Arc::clone(&self.signals_seen),
        }
    }
}

/// What a signal task needs to request shutdown
struct SignalHandle {
    shutdown_tx: broadcast::Sender<()>,
    signals_seen: Arc<AtomicUsize>,
}

impl SignalHandle {
    fn signal_received(&self) {
        let previous = self.signals_seen.fetch_add(1, Ordering::AcqRel);
        if previous >= 1 {
            log::warn!("Second signal received; exiting");
            std::process::exit(FORCED_EXIT_CODE);
        }
        log::info!("Shutdown requested; finishing the current job");
        let _ = self.shutdown_tx.send(());
    }
}
