//! Graceful shutdown on SIGTERM or Ctrl-C.

use std::io;
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Listens for a shutdown signal in the background and cancels a token when one
/// arrives.
///
/// ```no_run
/// # async fn serve() -> std::io::Result<()> {
/// use stylustx_relay_local::util::SigDown;
///
/// let sig_down = SigDown::try_new()?;
/// let token = sig_down.cancellation_token();
/// token.cancelled().await;
/// # Ok(())
/// # }
/// ```
pub struct SigDown {
    task_tracker: TaskTracker,
    cancellation_token: CancellationToken,
}

impl SigDown {
    /// Registers the signal handlers. Must be called inside a Tokio runtime.
    pub fn try_new() -> Result<Self, io::Error> {
        let mut sigterm = signal(SignalKind::terminate())?;
        let task_tracker = TaskTracker::new();
        let cancellation_token = CancellationToken::new();
        let inner = cancellation_token.clone();
        task_tracker.spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => {
                    #[cfg(feature = "telemetry")]
                    tracing::info!("Received SIGTERM, shutting down");
                }
                _ = tokio::signal::ctrl_c() => {
                    #[cfg(feature = "telemetry")]
                    tracing::info!("Received Ctrl-C, shutting down");
                }
                _ = inner.cancelled() => {}
            }
            inner.cancel();
        });
        task_tracker.close();
        Ok(Self {
            task_tracker,
            cancellation_token,
        })
    }

    /// A token cancelled once a shutdown signal arrives.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Cancels the token without waiting for a signal.
    pub fn shutdown(&self) {
        self.cancellation_token.cancel();
    }

    /// Waits until a shutdown signal arrives and the listener task has finished.
    pub async fn recv(&self) {
        self.cancellation_token.cancelled().await;
        self.task_tracker.wait().await;
    }
}
