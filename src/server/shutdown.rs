//! Shutdown signalling
//!
//! One single-slot channel feeds the lifecycle's wait point. OS signals and the request
//! accountant both hold a [`ShutdownSignal`] and call [`ShutdownSignal::trigger`]; only the first
//! trigger matters, later ones are dropped without blocking the caller.

use std::fmt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info};

/// Why the server is stopping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / Ctrl-C
    Interrupt,
    /// SIGTERM
    Terminate,
    /// The configured response count was reached
    ThresholdReached(u64),
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Interrupt => f.write_str("interrupt"),
            ShutdownReason::Terminate => f.write_str("terminate"),
            ShutdownReason::ThresholdReached(count) => write!(f, "{} responses served", count),
        }
    }
}

/// Producer side, cheap to clone
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: mpsc::Sender<ShutdownReason>,
}

/// Consumer side, owned by the lifecycle
#[derive(Debug)]
pub struct ShutdownListener {
    rx: mpsc::Receiver<ShutdownReason>,
}

/// Create a connected signal/listener pair
pub fn channel() -> (ShutdownSignal, ShutdownListener) {
    let (tx, rx) = mpsc::channel(1);
    (ShutdownSignal { tx }, ShutdownListener { rx })
}

impl ShutdownSignal {
    /// Request shutdown. Never blocks.
    ///
    /// Returns `true` if this call filled the slot, `false` if a shutdown was already pending
    /// or the listener is gone.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        match self.tx.try_send(reason) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("shutdown already requested, ignoring {}", reason);
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!("shutdown listener closed, ignoring {}", reason);
                false
            }
        }
    }
}

impl ShutdownListener {
    /// Wait for the first shutdown request.
    ///
    /// Returns `None` once every [`ShutdownSignal`] has been dropped with nothing sent.
    pub async fn wait(&mut self) -> Option<ShutdownReason> {
        self.rx.recv().await
    }

    /// Non-blocking check for a pending request
    pub fn try_wait(&mut self) -> Option<ShutdownReason> {
        self.rx.try_recv().ok()
    }
}

/// Forward SIGINT and SIGTERM into `signal` from a background task
pub fn forward_os_signals(signal: ShutdownSignal) {
    tokio::spawn(async move {
        match wait_for_os_signal().await {
            Ok(reason) => {
                info!("received {} signal", reason);
                signal.trigger(reason);
            }
            Err(e) => error!("unable to install signal handlers: {}", e),
        }
    });
}

#[cfg(unix)]
async fn wait_for_os_signal() -> std::io::Result<ShutdownReason> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|()| ShutdownReason::Interrupt),
        _ = terminate.recv() => Ok(ShutdownReason::Terminate),
    }
}

#[cfg(not(unix))]
async fn wait_for_os_signal() -> std::io::Result<ShutdownReason> {
    tokio::signal::ctrl_c().await?;
    Ok(ShutdownReason::Interrupt)
}
