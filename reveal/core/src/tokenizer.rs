//! Tokenizer
//!
//! Splits a message into the ordered reveal units the clock hands out one at
//! a time. Units are stored as byte offsets into the shared message, so any
//! revealed prefix is a plain sub-slice of the original text.

use std::sync::Arc;

use unicode_segmentation::UnicodeSegmentation;

use crate::config::RevealMode;

/// The tokenized message: an immutable sequence of reveal units
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tokens {
    message: Arc<str>,
    mode: RevealMode,
    /// Exclusive byte end of each unit, strictly increasing
    ends: Vec<usize>,
}

impl Tokens {
    /// Tokenize `message` according to `mode`
    pub fn new(message: impl Into<Arc<str>>, mode: RevealMode) -> Self {
        let message = message.into();
        let ends = match mode {
            RevealMode::Char => grapheme_ends(&message),
            RevealMode::Word => word_ends(&message),
        };
        Self {
            message,
            mode,
            ends,
        }
    }

    /// Total number of reveal units (N)
    #[must_use]
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    /// True when there is nothing to reveal
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Mode used to split the message
    #[must_use]
    pub fn mode(&self) -> RevealMode {
        self.mode
    }

    /// The full original message
    #[must_use]
    pub fn message(&self) -> &Arc<str> {
        &self.message
    }

    /// A single unit by index
    #[must_use]
    pub fn unit(&self, index: usize) -> Option<&str> {
        let end = *self.ends.get(index)?;
        let start = if index == 0 { 0 } else { self.ends[index - 1] };
        Some(&self.message[start..end])
    }

    /// Iterate over all units in order
    pub fn units(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.len()).filter_map(move |i| self.unit(i))
    }

    /// Concatenation of the first `count` units
    ///
    /// `count` is clamped to the number of units.
    #[must_use]
    pub fn prefix(&self, count: usize) -> &str {
        match count.min(self.len()) {
            0 => "",
            n => &self.message[..self.ends[n - 1]],
        }
    }
}

fn grapheme_ends(message: &str) -> Vec<usize> {
    message
        .grapheme_indices(true)
        .map(|(start, g)| start + g.len())
        .collect()
}

/// Each unit is a run of non-whitespace plus the whitespace that follows it.
/// Leading whitespace belongs to the first unit.
fn word_ends(message: &str) -> Vec<usize> {
    let mut ends = Vec::new();
    let mut chars = message.char_indices().peekable();

    // Leading whitespace is folded into the first unit
    while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

    loop {
        let mut consumed = false;
        while chars.next_if(|(_, c)| !c.is_whitespace()).is_some() {
            consumed = true;
        }
        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {
            consumed = true;
        }

        let end = chars.peek().map_or(message.len(), |(i, _)| *i);
        let last = ends.last().copied().unwrap_or(0);
        if end > last {
            ends.push(end);
        } else if !consumed {
            break;
        }

        if chars.peek().is_none() {
            break;
        }
    }

    ends
}
