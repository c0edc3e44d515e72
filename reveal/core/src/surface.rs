//! Surface Capability
//!
//! The narrow interface the engine consumes from a windowing backend: list
//! monitors, create a borderless always-on-top surface on one of them, push
//! text into it, and destroy it. Backends report user-initiated closes as
//! [`SurfaceEvent`]s over a channel handed to them at construction.

use std::fmt;

use thiserror::Error;

use crate::color::CssColor;
use crate::config::OverlayConfig;
use crate::render::RenderFrame;

/// Identifier the Surface Set Manager assigns to each surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u32);

impl SurfaceId {
    /// Wrap a raw value; live surfaces get theirs from the manager
    #[must_use]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw numeric value
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// A monitor as reported by the backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonitorInfo {
    /// Position in the backend's monitor list
    pub index: usize,
    /// Connector or output name (e.g. `DP-1`)
    pub name: String,
    /// Width in the backend's units
    pub width: u32,
    /// Height in the backend's units
    pub height: u32,
}

/// Where a surface should be placed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MonitorRef {
    /// Whatever monitor currently has focus
    Focused,
    /// A specific monitor from [`SurfaceBackend::monitors`]
    Output(MonitorInfo),
}

impl fmt::Display for MonitorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Focused => write!(f, "focused monitor"),
            Self::Output(info) => write!(f, "{} (#{})", info.name, info.index),
        }
    }
}

/// Styling shared by every surface for the whole run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurfaceStyle {
    /// Font size in pixels
    pub font_size: u32,
    /// Text colour
    pub color: CssColor,
    /// Surface background
    pub background: CssColor,
    /// Namespace (layer-shell namespace, window title)
    pub namespace: String,
}

impl SurfaceStyle {
    /// Extract the styling part of the configuration
    #[must_use]
    pub fn from_config(config: &OverlayConfig) -> Self {
        Self {
            font_size: config.font_size,
            color: config.color.clone(),
            background: config.background.clone(),
            namespace: config.namespace.clone(),
        }
    }
}

/// Errors reported by a backend
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The backend cannot provide this kind of surface at all
    #[error("surface backend unavailable: {0}")]
    Unavailable(String),

    /// The target is already occupied by another surface
    #[error("{0} is already showing a surface")]
    Busy(String),

    /// The surface has already been destroyed or closed
    #[error("surface is closed")]
    Closed,

    /// I/O failure talking to the display
    #[error("display I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other backend failure
    #[error("{0}")]
    Backend(String),
}

/// Events a backend reports on its own initiative
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The user or compositor closed this surface
    Closed(SurfaceId),
    /// The user asked to dismiss the whole overlay (Escape, Enter)
    Dismissed(SurfaceId),
    /// The surface changed size and should be redrawn
    Resized(SurfaceId),
}

impl SurfaceEvent {
    /// The surface the event is about
    #[must_use]
    pub fn surface(&self) -> SurfaceId {
        match self {
            Self::Closed(id) | Self::Dismissed(id) | Self::Resized(id) => *id,
        }
    }
}

/// One on-screen surface
pub trait Surface {
    /// Replace the visible content
    ///
    /// Called once per tick at most, with the same frame for every surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame could not be shown; the manager then
    /// drops this surface.
    fn set_text(&mut self, frame: &RenderFrame, style: &SurfaceStyle) -> Result<(), SurfaceError>;

    /// Release every resource held by the surface; must be idempotent
    fn destroy(&mut self);
}

/// Factory for surfaces
pub trait SurfaceBackend {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Monitors currently attached
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot enumerate outputs.
    fn monitors(&mut self) -> Result<Vec<MonitorInfo>, SurfaceError>;

    /// Create a surface on `target`
    ///
    /// `id` tags any [`SurfaceEvent`] the surface later reports.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be created on that target.
    fn create_surface(
        &mut self,
        id: SurfaceId,
        target: &MonitorRef,
        style: &SurfaceStyle,
    ) -> Result<Box<dyn Surface>, SurfaceError>;
}
