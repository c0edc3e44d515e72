//! Widgets

pub mod text_block;

pub use text_block::{layout_frame, TextBlock, TextLayout};
