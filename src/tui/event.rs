//! TUI event loop messages.
//!
//! The runner multiplexes crossterm input, finished API calls, and the
//! tick interval into a single stream of `TuiMessage`s.

use crossterm::event::KeyEvent;

use crate::controller::ApiResponse;

/// Messages that drive the TUI update loop.
#[derive(Debug)]
pub enum TuiMessage {
    /// Keyboard input.
    Input(KeyEvent),
    /// A finished API call.
    Api(ApiResponse),
    /// Tick: expire toasts, housekeeping.
    Tick,
    /// Quit the TUI.
    Quit,
}
