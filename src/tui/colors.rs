//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Focused field borders and primary buttons.
pub const PRIMARY: Color = Color::Rgb(37, 99, 235);
/// Error panels and banners.
pub const DANGER: Color = Color::Rgb(185, 28, 28);
/// Secondary text such as labels and hints.
pub const MUTED: Color = Color::Rgb(107, 114, 128);
/// Success alerts.
pub const SUCCESS: Color = Color::Rgb(22, 101, 52);
