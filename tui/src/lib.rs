//! Reveal TUI - Terminal surface backend for reveal-message
//!
//! Renders the overlay full-screen on the controlling terminal with
//! ratatui, standing in for a compositor layer surface.
//!
//! # Architecture
//!
//! - **Backend**: [`TerminalBackend`] implements the engine's surface
//!   capability; one terminal, one surface
//! - **Widgets**: [`TextBlock`] lays a frame out (wrap, reserve, centre)
//! - **Input**: crossterm event stream mapped to dismiss and resize events
//! - **Theme**: CSS colours to terminal colours

#![deny(missing_docs)]

pub mod backend;
pub mod input;
pub mod theme;
pub mod widgets;

pub use backend::{install_panic_hook, TerminalBackend, TerminalSurface};
pub use widgets::{layout_frame, TextBlock, TextLayout};
