//! Cooperative event loop
//!
//! One task, one thread. The loop waits on three sources in a fixed order
//! of preference (termination signal, surface events, next timer deadline)
//! and hands whatever arrives to the [`LifecycleController`]. The controller
//! only ever runs between waits, so no state is shared or locked.
//!
//! Time comes from `tokio::time`, so tests can run the loop with a paused
//! clock and step through a multi-second reveal instantly.

use std::future::Future;
use std::time::Instant;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::RevealError;
use crate::lifecycle::{LifecycleController, LoopEvent, Outcome, TerminationCause};
use crate::surface::{SurfaceBackend, SurfaceEvent};
use crate::timer::TimerQueue;

/// Drive `controller` until it terminates
///
/// `events` carries what the backend reports (closes, dismissals,
/// resizes). `shutdown` resolves when the process is asked to exit.
///
/// # Errors
///
/// Returns the controller's fatal error. Surfaces are already destroyed
/// and every timer released when this returns, whatever the result.
pub async fn run<F>(
    controller: &mut LifecycleController,
    backend: &mut dyn SurfaceBackend,
    mut events: UnboundedReceiver<SurfaceEvent>,
    shutdown: F,
) -> Result<Outcome, RevealError>
where
    F: Future<Output = TerminationCause>,
{
    let mut queue = TimerQueue::new(loop_now());
    let result = drive(controller, backend, &mut queue, &mut events, shutdown).await;
    queue.close();
    match &result {
        Ok(outcome) => tracing::debug!(%outcome, "Event loop finished"),
        Err(error) => tracing::debug!(%error, "Event loop aborted"),
    }
    result
}

async fn drive<F>(
    controller: &mut LifecycleController,
    backend: &mut dyn SurfaceBackend,
    queue: &mut TimerQueue,
    events: &mut UnboundedReceiver<SurfaceEvent>,
    shutdown: F,
) -> Result<Outcome, RevealError>
where
    F: Future<Output = TerminationCause>,
{
    controller.start(backend, queue)?;
    tracing::debug!(phase = %controller.phase(), "Event loop started");

    tokio::pin!(shutdown);
    let mut shutdown_pending = true;
    let mut events_open = true;

    loop {
        if let Some(outcome) = controller.outcome() {
            return Ok(outcome);
        }

        let deadline = queue.next_deadline();
        tokio::select! {
            biased;

            cause = &mut shutdown, if shutdown_pending => {
                shutdown_pending = false;
                queue.advance(loop_now());
                controller.handle(LoopEvent::Terminate(cause), queue)?;
            }

            event = events.recv(), if events_open => match event {
                Some(event) => {
                    queue.advance(loop_now());
                    controller.handle(LoopEvent::Surface(event), queue)?;
                }
                None => {
                    tracing::debug!("Surface event channel closed");
                    events_open = false;
                }
            },

            () = wait_until(deadline) => {
                queue.advance(loop_now());
                while let Some(id) = queue.pop_due() {
                    controller.handle(LoopEvent::Timer(id), queue)?;
                    if controller.is_terminated() {
                        break;
                    }
                }
            }
        }
    }
}

fn loop_now() -> Instant {
    tokio::time::Instant::now().into_std()
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
