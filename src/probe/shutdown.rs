//! Cancellable waits for the poll loop

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Creates a connected trigger and signal
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    let tx = Arc::new(tx);
    (
        ShutdownTrigger { tx: Arc::clone(&tx) },
        ShutdownSignal { rx, _keep: Some(tx) },
    )
}

/// Requests shutdown; cheap to clone into sinks and signal handlers
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiving side; every sleep of the poll loop goes through [`wait`].
///
/// [`wait`]: ShutdownSignal::wait
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
    _keep: Option<Arc<watch::Sender<bool>>>,
}

impl ShutdownSignal {
    /// A signal that is never triggered
    pub fn never() -> Self {
        shutdown_channel().1
    }

    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Sleeps for `duration` unless shutdown is requested first.
    ///
    /// Returns `true` if shutdown was requested.
    pub async fn wait(&mut self, duration: Duration) -> bool {
        if self.is_shutdown() {
            return true;
        }

        let sleep = tokio::time::sleep(duration);
        tokio::pin!(sleep);

        let stopped = tokio::select! {
            _ = &mut sleep => return false,
            result = self.rx.wait_for(|&stop| stop) => result.is_ok(),
        };

        if !stopped {
            // every trigger is gone; finish the wait
            sleep.await;
        }
        stopped
    }
}
