//! The full-screen terminal surface

use std::io::{self, Stdout};

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use reveal_core::{RenderFrame, Surface, SurfaceError, SurfaceEvent, SurfaceId, SurfaceStyle};

use crate::input;
use crate::widgets::TextBlock;

/// Alternate-screen surface; restores the terminal on destroy and on drop
pub struct TerminalSurface {
    id: SurfaceId,
    terminal: Option<Terminal<CrosstermBackend<Stdout>>>,
    input: Option<JoinHandle<()>>,
    raw_mode: bool,
}

impl TerminalSurface {
    /// Switch the terminal into overlay mode and start reading keys
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Io`] if the terminal refuses raw mode or the
    /// alternate screen. Anything already changed is restored.
    pub fn open(
        id: SurfaceId,
        style: &SurfaceStyle,
        events: UnboundedSender<SurfaceEvent>,
    ) -> Result<Self, SurfaceError> {
        enable_raw_mode()?;
        let mut surface = Self {
            id,
            terminal: None,
            input: None,
            raw_mode: true,
        };

        // On error `surface` is dropped here, which restores the terminal
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            SetTitle(&style.namespace),
            Hide
        )?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        terminal.clear()?;
        surface.terminal = Some(terminal);
        surface.input = Some(input::spawn_reader(id, events));

        tracing::debug!(surface = %id, namespace = %style.namespace, "Terminal surface opened");
        Ok(surface)
    }

    fn restore(&mut self) -> io::Result<()> {
        if self.raw_mode {
            self.raw_mode = false;
            disable_raw_mode()?;
            execute!(io::stdout(), LeaveAlternateScreen, Show)?;
        }
        Ok(())
    }
}

impl Surface for TerminalSurface {
    fn set_text(&mut self, frame: &RenderFrame, style: &SurfaceStyle) -> Result<(), SurfaceError> {
        let terminal = self.terminal.as_mut().ok_or(SurfaceError::Closed)?;
        terminal.draw(|f| f.render_widget(TextBlock::new(frame, style), f.area()))?;
        Ok(())
    }

    fn destroy(&mut self) {
        if let Some(input) = self.input.take() {
            input.abort();
        }
        self.terminal = None;
        if let Err(error) = self.restore() {
            tracing::warn!(surface = %self.id, %error, "Failed to restore the terminal");
        }
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        self.destroy();
    }
}
