//! Enumerations for TUI state management.

use crate::page::Alert;
use crate::tui::input::InputField;

/// Modal layer drawn above the current view.
#[derive(Clone, Debug)]
pub enum Overlay {
    None,
    /// Blocking message; any key dismisses it.
    Alert(Alert),
    /// Prompt for another team member id to open.
    GoTo(InputField),
}

/// What the user asked for with a key press on the form.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FormAction {
    Submit,
    Cancel,
    Edited,
    Nothing,
}
