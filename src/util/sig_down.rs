//! Graceful shutdown signal handling.
//!
//! [`SigDown`] cancels a token on the first SIGTERM or SIGINT (Ctrl-C on non-unix targets),
//! so the HTTP server stops accepting connections and drains in-flight claims before exiting.

use std::future::Future;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

pub struct SigDown {
    task_tracker: TaskTracker,
    cancellation_token: CancellationToken,
}

impl SigDown {
    /// Registers the signal handlers.
    pub fn try_new() -> Result<Self, std::io::Error> {
        let signal = shutdown_signal()?;
        let cancellation_token = CancellationToken::new();
        let task_tracker = TaskTracker::new();
        let token = cancellation_token.clone();
        task_tracker.spawn(async move {
            let name = signal.await;
            tracing::info!(signal = name, "Shutdown requested, draining connections");
            token.cancel();
        });
        task_tracker.close();
        Ok(Self {
            task_tracker,
            cancellation_token,
        })
    }

    /// Future for [`axum::serve::Serve::with_graceful_shutdown`].
    pub fn graceful_shutdown(&self) -> impl Future<Output = ()> + Send + 'static {
        self.cancellation_token.clone().cancelled_owned()
    }

    /// Waits for a shutdown signal and for the handler task to finish.
    pub async fn recv(&self) {
        self.cancellation_token.cancelled().await;
        self.task_tracker.wait().await;
    }
}

#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = &'static str> + Send, std::io::Error> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = &'static str> + Send, std::io::Error> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
        "Ctrl-C"
    })
}
