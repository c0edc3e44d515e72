//! Process signals
//!
//! SIGINT, SIGTERM and SIGHUP all close the overlay. A one-shot overlay
//! has no configuration to reload, so SIGHUP means "the terminal went
//! away" here.

use std::io;

use tokio::signal::unix::{signal, Signal, SignalKind};

use reveal_core::TerminationCause;

/// Installed handlers for the signals that end a run
pub struct Signals {
    interrupt: Signal,
    terminate: Signal,
    hangup: Signal,
}

impl Signals {
    /// Install the handlers
    ///
    /// Must be called from inside the tokio runtime.
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    /// Wait for the first of the handled signals
    pub async fn recv(&mut self) -> TerminationCause {
        tokio::select! {
            _ = self.interrupt.recv() => TerminationCause::Interrupt,
            _ = self.terminate.recv() => TerminationCause::Terminate,
            _ = self.hangup.recv() => TerminationCause::Hangup,
        }
    }
}

/// Resolve with the first signal; never resolves without handlers
pub async fn shutdown(signals: Option<Signals>) -> TerminationCause {
    match signals {
        Some(mut signals) => {
            let cause = signals.recv().await;
            tracing::info!(%cause, "Received signal, closing overlay");
            cause
        }
        None => std::future::pending().await,
    }
}
