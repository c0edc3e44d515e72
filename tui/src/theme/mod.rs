//! Theme and Colors
//!
//! Maps the overlay's CSS colours onto terminal colours.
//!
//! Terminals have no alpha channel: a fully transparent colour becomes
//! [`Color::Reset`] so the user's own terminal background shows through,
//! anything else is drawn as its opaque RGB value.

use ratatui::style::{Color, Modifier, Style};

use reveal_core::{CssColor, SurfaceStyle};

// ============================================================================
// Layout
// ============================================================================

/// Blank rows kept above and below the text
pub const MARGIN_ROWS: u16 = 1;

/// Blank columns kept left and right of the text
pub const MARGIN_COLUMNS: u16 = 2;

// ============================================================================
// Colours
// ============================================================================

/// Terminal colour for a CSS colour
#[must_use]
pub fn terminal_color(color: &CssColor) -> Color {
    let rgba = color.rgba();
    if rgba.is_transparent() {
        Color::Reset
    } else {
        Color::Rgb(rgba.r, rgba.g, rgba.b)
    }
}

/// Style for the message text (bold, like the 700 weight on a compositor)
#[must_use]
pub fn text_style(style: &SurfaceStyle) -> Style {
    Style::default()
        .fg(terminal_color(&style.color))
        .bg(terminal_color(&style.background))
        .add_modifier(Modifier::BOLD)
}

/// Style for the empty area around the text
#[must_use]
pub fn background_style(style: &SurfaceStyle) -> Style {
    Style::default().bg(terminal_color(&style.background))
}
