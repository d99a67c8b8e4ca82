//! The ratatui presentation layer.
//!
//! ## Architecture (TEA)
//!
//! Model (`DashboardController` + `TuiApp` chrome) + Update (message
//! handler) + View (render). Immediate mode, no retained widget state.
//! The TUI never calls the API itself; it queues commands on the
//! controller and the runner executes them.

pub mod app;
pub mod event;
pub mod format;
pub mod input;
pub mod layout;
pub mod runner;
