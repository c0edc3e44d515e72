//! Terminal Surface Backend
//!
//! Shows the overlay full-screen on the controlling terminal. A terminal is
//! a single screen, so it reports exactly one monitor and hands out exactly
//! one surface; asking for a second one fails with [`SurfaceError::Busy`].

mod surface;

use std::io::{self, IsTerminal};
use std::panic;

use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::{self, disable_raw_mode, LeaveAlternateScreen};
use tokio::sync::mpsc::UnboundedSender;

use reveal_core::{
    MonitorInfo, MonitorRef, Surface, SurfaceBackend, SurfaceError, SurfaceEvent, SurfaceId,
    SurfaceStyle,
};

pub use surface::TerminalSurface;

/// Name the terminal reports as its only monitor
pub const TERMINAL_MONITOR: &str = "terminal";

/// [`SurfaceBackend`] for the controlling terminal
pub struct TerminalBackend {
    events: UnboundedSender<SurfaceEvent>,
    claimed: bool,
}

impl TerminalBackend {
    /// Create a backend that reports surface events on `events`
    #[must_use]
    pub fn new(events: UnboundedSender<SurfaceEvent>) -> Self {
        Self {
            events,
            claimed: false,
        }
    }
}

impl SurfaceBackend for TerminalBackend {
    fn name(&self) -> &str {
        TERMINAL_MONITOR
    }

    fn monitors(&mut self) -> Result<Vec<MonitorInfo>, SurfaceError> {
        let (width, height) = terminal::size()?;
        Ok(vec![MonitorInfo {
            index: 0,
            name: TERMINAL_MONITOR.to_string(),
            width: u32::from(width),
            height: u32::from(height),
        }])
    }

    fn create_surface(
        &mut self,
        id: SurfaceId,
        target: &MonitorRef,
        style: &SurfaceStyle,
    ) -> Result<Box<dyn Surface>, SurfaceError> {
        if self.claimed {
            return Err(SurfaceError::Busy(target.to_string()));
        }
        if !io::stdout().is_terminal() {
            return Err(SurfaceError::Unavailable(
                "stdout is not a terminal (TTY)".to_string(),
            ));
        }

        let surface = TerminalSurface::open(id, style, self.events.clone())?;
        self.claimed = true;
        Ok(Box::new(surface))
    }
}

/// Restore the terminal before the default panic message is printed
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use reveal_core::OverlayConfig;
    use tokio::sync::mpsc;

    #[test]
    fn test_backend_name() {
        let (tx, _rx) = mpsc::unbounded_channel();
        assert_eq!(TerminalBackend::new(tx).name(), "terminal");
    }

    #[test]
    fn test_second_surface_is_busy() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut backend = TerminalBackend::new(tx);
        backend.claimed = true;

        let style = SurfaceStyle::from_config(&OverlayConfig::default());
        let result = backend.create_surface(SurfaceId::new(1), &MonitorRef::Focused, &style);
        assert!(matches!(result, Err(SurfaceError::Busy(_))));
    }
}
