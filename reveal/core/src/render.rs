//! Reveal Renderer
//!
//! Pure mapping from reveal progress to what a surface should show.

use std::sync::Arc;

use crate::clock::RevealState;
use crate::config::AlignmentPolicy;
use crate::tokenizer::Tokens;

/// Horizontal anchoring of the visible text
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Lines start at the left edge of the text box
    Left,
    /// Lines are centered in the text box
    Center,
}

/// Everything a surface needs to draw one frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderFrame {
    /// Concatenation of the revealed units
    pub visible_text: String,
    /// How lines are anchored
    pub alignment: Alignment,
    /// Text whose size the layout should reserve, so a left-anchored reveal
    /// does not shift sideways as it grows
    pub reserve: Option<Arc<str>>,
}

impl RenderFrame {
    /// Whether nothing is visible yet
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.visible_text.is_empty()
    }
}

/// Compute the frame for `state` under `policy`
#[must_use]
pub fn render(state: &RevealState, policy: AlignmentPolicy, tokens: &Tokens) -> RenderFrame {
    let total = tokens.len();
    let revealed = state.revealed_count.min(total);
    let complete = revealed == total;

    let (alignment, reserve) = match policy {
        AlignmentPolicy::Left => (Alignment::Left, None),
        AlignmentPolicy::Center => (Alignment::Center, None),
        AlignmentPolicy::LeftToCenter if complete => (Alignment::Center, None),
        AlignmentPolicy::LeftToCenter => (Alignment::Left, Some(Arc::clone(tokens.message()))),
    };

    RenderFrame {
        visible_text: tokens.prefix(revealed).to_string(),
        alignment,
        reserve,
    }
}
