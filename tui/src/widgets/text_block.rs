//! TextBlock Widget
//!
//! Draws one [`RenderFrame`]: wrapped, bold, vertically centred, and
//! anchored according to the frame's alignment.
//!
//! While a left-to-center reveal is running the frame carries the full
//! message. The block is then laid out as if the whole message were
//! visible and only the revealed part is painted, so the text neither
//! reflows nor drifts sideways as it grows.

use std::borrow::Cow;

use ratatui::buffer::Buffer;
use ratatui::layout::{Margin, Rect};
use ratatui::widgets::Widget;
use textwrap::{wrap, Options};
use unicode_width::UnicodeWidthStr;

use reveal_core::{Alignment, RenderFrame, SurfaceStyle};

use crate::theme::{background_style, text_style, MARGIN_COLUMNS, MARGIN_ROWS};

/// Wrapped lines of a frame plus the box they sit in
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextLayout {
    /// Lines to paint, top to bottom
    pub lines: Vec<String>,
    /// Width of the text box in cells
    pub box_width: u16,
    /// Height of the text box in rows
    pub box_height: u16,
}

/// Lay `frame` out for a text area `width` cells wide
#[must_use]
pub fn layout_frame(frame: &RenderFrame, width: u16) -> TextLayout {
    let options = Options::new(usize::from(width.max(1)));

    match frame.reserve.as_deref() {
        Some(full) => {
            let full_lines = wrap(full, &options);
            TextLayout {
                lines: revealed_lines(full, &full_lines, frame.visible_text.len()),
                box_width: widest(&full_lines),
                box_height: saturate(full_lines.len()),
            }
        }
        None => {
            let lines = wrap(&frame.visible_text, &options);
            TextLayout {
                box_width: widest(&lines),
                box_height: saturate(lines.len()),
                lines: lines.into_iter().map(Cow::into_owned).collect(),
            }
        }
    }
}

/// Cut the wrapped lines of `full` down to its first `visible` bytes
fn revealed_lines(full: &str, full_lines: &[Cow<'_, str>], visible: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut cursor = 0;

    for line in full_lines {
        let start = full
            .get(cursor..)
            .and_then(|rest| rest.find(line.as_ref()))
            .map_or(cursor, |offset| cursor + offset);
        let end = start + line.len();
        cursor = end;

        if visible <= start {
            break;
        }
        match full.get(start..end.min(visible)) {
            Some(shown) => lines.push(shown.to_string()),
            None => break,
        }
    }

    lines
}

fn widest(lines: &[Cow<'_, str>]) -> u16 {
    saturate(lines.iter().map(|l| l.width()).max().unwrap_or(0))
}

fn saturate(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Borderless block showing the revealed text
pub struct TextBlock<'a> {
    frame: &'a RenderFrame,
    style: &'a SurfaceStyle,
}

impl<'a> TextBlock<'a> {
    /// Widget that paints `frame` with the colours of `style`
    #[must_use]
    pub fn new(frame: &'a RenderFrame, style: &'a SurfaceStyle) -> Self {
        Self { frame, style }
    }
}

impl Widget for TextBlock<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, background_style(self.style));

        let inner = area.inner(Margin {
            horizontal: MARGIN_COLUMNS,
            vertical: MARGIN_ROWS,
        });
        if inner.is_empty() {
            return;
        }

        let layout = layout_frame(self.frame, inner.width);
        let height = layout.box_height.min(inner.height);
        let top = inner.y + (inner.height - height) / 2;
        let box_width = layout.box_width.min(inner.width);
        let box_x = inner.x + (inner.width - box_width) / 2;
        let style = text_style(self.style);

        for (row, line) in (0..height).zip(&layout.lines) {
            let line_width = saturate(line.width()).min(inner.width);
            let x = match self.frame.alignment {
                Alignment::Left => box_x,
                Alignment::Center => inner.x + (inner.width - line_width) / 2,
            };
            buf.set_stringn(x, top + row, line, usize::from(inner.right() - x), style);
        }
    }
}
