//! Reveal Core - Typewriter Reveal Engine for reveal-message
//!
//! This crate holds everything about the overlay that has state or timing:
//! splitting the message into reveal units, advancing progress at a fixed
//! rate, turning progress into frames, fanning frames out to every surface,
//! and sequencing the run from first frame to teardown. Actual drawing is
//! left to a [`SurfaceBackend`] implementation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Surface Backends                        │
//! │   ┌─────────────────────┐      ┌──────────────────────────┐  │
//! │   │ Terminal (ratatui)  │      │ Layer-shell (compositor) │  │
//! │   └──────────┬──────────┘      └────────────┬─────────────┘  │
//! │              └───────────────┬──────────────┘                │
//! │          set_text / destroy (down)   SurfaceEvent (up)       │
//! └──────────────────────────────┼───────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┼───────────────────────────────┐
//! │                         REVEAL CORE                          │
//! │  ┌───────────────────────────┴────────────────────────────┐  │
//! │  │                  LifecycleController                   │  │
//! │  │  ┌───────────┐ ┌────────────┐ ┌──────────┐ ┌─────────┐ │  │
//! │  │  │ Tokenizer │ │RevealClock │ │ Renderer │ │SurfaceSet│ │  │
//! │  │  └───────────┘ └─────┬──────┘ └──────────┘ └─────────┘ │  │
//! │  └──────────────────────┼─────────────────────────────────┘  │
//! │                    TimerQueue ◄── event_loop::run            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`LifecycleController`]: Owns the run and reacts to loop events
//! - [`Tokens`]: The message split into reveal units
//! - [`RevealClock`]: Timer-driven progress counter
//! - [`RenderFrame`]: What every surface shows right now
//! - [`SurfaceSet`]: Arena of live surfaces, destroyed exactly once
//! - [`TimerQueue`]: Single-threaded timer scheduler
//! - [`OverlayConfig`]: Validated, immutable run configuration
//!
//! # Quick Start
//!
//! ```ignore
//! use reveal_core::{event_loop, LifecycleController, OverlayConfig, TerminationCause};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let (tx, rx) = mpsc::unbounded_channel();
//!     let mut backend = MyBackend::new(tx);
//!     let mut controller = LifecycleController::new(OverlayConfig::default(), "Hello!");
//!
//!     let shutdown = async {
//!         tokio::signal::ctrl_c().await.ok();
//!         TerminationCause::Interrupt
//!     };
//!     let outcome = event_loop::run(&mut controller, &mut backend, rx, shutdown).await;
//! }
//! ```
//!
//! # No Toolkit Dependencies
//!
//! This crate does not depend on ratatui, crossterm or any windowing
//! library. It can be driven entirely by fakes in tests.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod color;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod lifecycle;
pub mod render;
pub mod surface;
pub mod surface_set;
pub mod timer;
pub mod tokenizer;

// Re-exports for convenience
pub use clock::{RevealClock, RevealState, TickOutcome};
pub use color::{ColorError, CssColor, Rgba};
pub use config::{
    default_config_path, load_config, load_config_from_path, AlignmentPolicy, ConfigError,
    ConfigFile, ConfigOverrides, ConfigSource, MonitorSelection, OverlayConfig, RevealMode,
};
pub use error::RevealError;
pub use lifecycle::{LifecycleController, LoopEvent, Outcome, Phase, TerminationCause, Transition};
pub use render::{render, Alignment, RenderFrame};
pub use surface::{
    MonitorInfo, MonitorRef, Surface, SurfaceBackend, SurfaceError, SurfaceEvent, SurfaceId,
    SurfaceStyle,
};
pub use surface_set::{ApplyReport, CreationFailure, SurfaceSet};
pub use timer::{Scheduler, TimerError, TimerId, TimerQueue};
pub use tokenizer::Tokens;
