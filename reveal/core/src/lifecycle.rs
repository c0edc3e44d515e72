//! Lifecycle Controller
//!
//! Top-level sequencer for one run of the overlay.
//!
//! ```text
//!            N == 0
//!   Init ───────────────┐
//!    │                  ▼
//!    └──► Revealing ──► Holding ──► Closing ──► Terminated
//!             │            │           ▲
//!             └────────────┴───────────┘
//!           signal, dismiss, last surface closed
//! ```
//!
//! The controller owns the message, the configuration, the reveal clock and
//! the surface set. It never waits on anything itself: the event loop feeds
//! it [`LoopEvent`]s one at a time and it reacts synchronously, scheduling
//! and cancelling timers through a [`Scheduler`].
//!
//! Every path out of `Revealing` and `Holding` goes through `Closing`, which
//! releases the clock timer, the auto-close timer and every surface before
//! the controller reaches `Terminated`.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::clock::{RevealClock, TickOutcome};
use crate::config::OverlayConfig;
use crate::error::RevealError;
use crate::render::{render, RenderFrame};
use crate::surface::{SurfaceBackend, SurfaceEvent, SurfaceStyle};
use crate::surface_set::SurfaceSet;
use crate::timer::{Scheduler, TimerId};
use crate::tokenizer::Tokens;

/// Lifecycle phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Configuration read, surfaces not yet created
    Init,
    /// Clock is ticking
    Revealing,
    /// Message fully visible; waiting for auto-close or an external close
    Holding,
    /// Tearing down
    Closing,
    /// Done
    Terminated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Revealing => "revealing",
            Self::Holding => "holding",
            Self::Closing => "closing",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Process signal that asked the overlay to go away
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationCause {
    /// SIGINT
    Interrupt,
    /// SIGTERM
    Terminate,
    /// SIGHUP
    Hangup,
}

impl fmt::Display for TerminationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
            Self::Hangup => "SIGHUP",
        };
        f.write_str(name)
    }
}

/// Something the event loop hands to the controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopEvent {
    /// A scheduled timer is due
    Timer(TimerId),
    /// A surface reported something
    Surface(SurfaceEvent),
    /// External termination request
    Terminate(TerminationCause),
}

/// How a successful run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The auto-close timer expired
    AutoClosed,
    /// The user dismissed the overlay
    Dismissed,
    /// The user or compositor closed every surface
    SurfacesClosed,
    /// A signal arrived
    Terminated(TerminationCause),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AutoClosed => write!(f, "auto-closed"),
            Self::Dismissed => write!(f, "dismissed"),
            Self::SurfacesClosed => write!(f, "all surfaces closed"),
            Self::Terminated(cause) => write!(f, "terminated by {cause}"),
        }
    }
}

/// One recorded phase change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Phase left
    pub from: Phase,
    /// Phase entered
    pub to: Phase,
    /// Scheduler time of the change
    pub at: Instant,
}

/// Single owned sequencer for the run
pub struct LifecycleController {
    config: OverlayConfig,
    tokens: Tokens,
    phase: Phase,
    clock: Option<RevealClock>,
    surfaces: Option<SurfaceSet>,
    auto_close: Option<TimerId>,
    outcome: Option<Outcome>,
    transitions: Vec<Transition>,
}

impl LifecycleController {
    /// Tokenize `message` and prepare a run; nothing is shown yet
    pub fn new(config: OverlayConfig, message: impl Into<Arc<str>>) -> Self {
        let tokens = Tokens::new(message, config.mode);
        tracing::debug!(units = tokens.len(), mode = %config.mode, "Message tokenized");
        Self {
            config,
            tokens,
            phase: Phase::Init,
            clock: None,
            surfaces: None,
            auto_close: None,
            outcome: None,
            transitions: Vec::new(),
        }
    }

    /// Create surfaces, show the first frame and start the reveal
    ///
    /// An empty message skips `Revealing` and goes straight to `Holding`.
    ///
    /// # Errors
    ///
    /// Returns an error if no surface could be created or a timer could not
    /// be scheduled. The controller is `Terminated` afterwards and nothing
    /// is left on screen.
    pub fn start(
        &mut self,
        backend: &mut dyn SurfaceBackend,
        scheduler: &mut dyn Scheduler,
    ) -> Result<(), RevealError> {
        if self.phase != Phase::Init {
            tracing::warn!(phase = %self.phase, "Lifecycle already started");
            return Ok(());
        }

        let style = SurfaceStyle::from_config(&self.config);
        match SurfaceSet::create(backend, self.config.monitors, style) {
            Ok(set) => self.surfaces = Some(set),
            Err(err) => return Err(self.fail(err, scheduler)),
        }

        let mut clock = RevealClock::new(
            self.tokens.len(),
            self.config.mode,
            self.config.speed,
            scheduler.now(),
        );

        if self.tokens.is_empty() {
            self.clock = Some(clock);
            self.push_frame(scheduler)?;
            return self.enter_holding(scheduler);
        }

        if let Err(err) = clock.start(scheduler) {
            return Err(self.fail(err.into(), scheduler));
        }
        self.clock = Some(clock);
        self.transition(Phase::Revealing, scheduler);
        self.push_frame(scheduler)
    }

    /// React to one event from the loop
    ///
    /// # Errors
    ///
    /// Returns an error if the run has to stop abnormally (every surface
    /// lost, auto-close timer unavailable). Teardown has already happened.
    pub fn handle(
        &mut self,
        event: LoopEvent,
        scheduler: &mut dyn Scheduler,
    ) -> Result<(), RevealError> {
        if matches!(self.phase, Phase::Closing | Phase::Terminated) {
            tracing::trace!(?event, phase = %self.phase, "Ignoring event after close");
            return Ok(());
        }

        match event {
            LoopEvent::Timer(id) => self.on_timer(id, scheduler),
            LoopEvent::Surface(SurfaceEvent::Closed(id)) => {
                let Some(surfaces) = self.surfaces.as_mut() else {
                    return Ok(());
                };
                if surfaces.close(id) && surfaces.is_empty() {
                    self.close(Outcome::SurfacesClosed, scheduler);
                }
                Ok(())
            }
            LoopEvent::Surface(SurfaceEvent::Dismissed(id)) => {
                tracing::info!(surface = %id, "Overlay dismissed");
                self.close(Outcome::Dismissed, scheduler);
                Ok(())
            }
            LoopEvent::Surface(SurfaceEvent::Resized(id)) => {
                tracing::debug!(surface = %id, "Surface resized, redrawing");
                self.push_frame(scheduler)
            }
            LoopEvent::Terminate(cause) => {
                tracing::info!(%cause, "Termination requested");
                self.close(Outcome::Terminated(cause), scheduler);
                Ok(())
            }
        }
    }

    fn on_timer(&mut self, id: TimerId, scheduler: &mut dyn Scheduler) -> Result<(), RevealError> {
        if self.auto_close == Some(id) {
            self.auto_close = None;
            tracing::info!("Auto-close timer expired");
            self.close(Outcome::AutoClosed, scheduler);
            return Ok(());
        }

        let Some(clock) = self.clock.as_mut().filter(|c| c.owns(id)) else {
            tracing::trace!(timer = %id, "Ignoring unknown timer");
            return Ok(());
        };

        match clock.on_tick(scheduler) {
            TickOutcome::Unchanged => Ok(()),
            TickOutcome::Advanced { from, to } => {
                tracing::trace!(from, to, "Reveal tick");
                self.push_frame(scheduler)
            }
            TickOutcome::Completed { from } => {
                tracing::trace!(from, to = self.tokens.len(), "Final reveal tick");
                self.push_frame(scheduler)?;
                self.enter_holding(scheduler)
            }
        }
    }

    fn enter_holding(&mut self, scheduler: &mut dyn Scheduler) -> Result<(), RevealError> {
        self.transition(Phase::Holding, scheduler);
        let Some(delay) = self.config.exit_after else {
            tracing::info!("Auto-close disabled, holding until closed");
            return Ok(());
        };
        match scheduler.schedule_once(delay) {
            Ok(timer) => {
                tracing::debug!(timer = %timer, ?delay, "Auto-close armed");
                self.auto_close = Some(timer);
                Ok(())
            }
            Err(err) => Err(self.fail(err.into(), scheduler)),
        }
    }

    /// Render the current progress and fan it out
    fn push_frame(&mut self, scheduler: &mut dyn Scheduler) -> Result<(), RevealError> {
        let Some(frame) = self.current_frame() else {
            return Ok(());
        };
        let Some(surfaces) = self.surfaces.as_mut() else {
            return Ok(());
        };

        let report = surfaces.apply(&frame);
        if !report.all_succeeded() {
            tracing::warn!(
                dropped = report.dropped.len(),
                remaining = surfaces.len(),
                "Surfaces dropped while rendering"
            );
        }
        if surfaces.is_empty() {
            return Err(self.fail(RevealError::AllSurfacesLost, scheduler));
        }
        Ok(())
    }

    /// Normal shutdown: `Closing`, teardown, `Terminated`
    fn close(&mut self, outcome: Outcome, scheduler: &mut dyn Scheduler) {
        self.outcome = Some(outcome);
        self.transition(Phase::Closing, scheduler);
        self.teardown(scheduler);
        self.transition(Phase::Terminated, scheduler);
        tracing::info!(%outcome, "Overlay closed");
    }

    /// Abnormal shutdown; returns the error for the caller to propagate
    fn fail(&mut self, err: RevealError, scheduler: &mut dyn Scheduler) -> RevealError {
        tracing::error!(error = %err, phase = %self.phase, "Overlay failed");
        if self.phase != Phase::Init {
            self.transition(Phase::Closing, scheduler);
        }
        self.teardown(scheduler);
        self.transition(Phase::Terminated, scheduler);
        err
    }

    fn teardown(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(clock) = self.clock.as_mut() {
            clock.stop(scheduler);
        }
        if let Some(timer) = self.auto_close.take() {
            scheduler.cancel(timer);
        }
        if let Some(mut surfaces) = self.surfaces.take() {
            surfaces.destroy();
        }
    }

    fn transition(&mut self, to: Phase, scheduler: &dyn Scheduler) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        self.transitions.push(Transition {
            from,
            to,
            at: scheduler.now(),
        });
        tracing::info!(%from, %to, "Lifecycle transition");
    }

    /// The frame surfaces currently show, if the reveal has started
    #[must_use]
    pub fn current_frame(&self) -> Option<RenderFrame> {
        let clock = self.clock.as_ref()?;
        Some(render(clock.state(), self.config.alignment, &self.tokens))
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// How the run ended, once it has
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Every phase change so far, in order
    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Whether the run is over
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Terminated
    }

    /// Units visible right now
    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.clock.as_ref().map_or(0, |c| c.state().revealed_count)
    }

    /// Number of surfaces still showing the overlay
    #[must_use]
    pub fn surface_count(&self) -> usize {
        self.surfaces.as_ref().map_or(0, SurfaceSet::len)
    }

    /// The tokenized message
    #[must_use]
    pub fn tokens(&self) -> &Tokens {
        &self.tokens
    }

    /// The configuration for this run
    #[must_use]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }
}

impl fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleController")
            .field("phase", &self.phase)
            .field("units", &self.tokens.len())
            .field("revealed", &self.revealed_count())
            .field("surfaces", &self.surface_count())
            .field("auto_close", &self.auto_close)
            .finish_non_exhaustive()
    }
}
