//! reportdeck — terminal dashboard for a test-report platform.
//!
//! Browses uploaded report archives (app → release → run), shows fetched
//! report markup, uploads new archives, and charts aggregate pass/fail
//! series. All data lives behind the platform's REST API; this client
//! holds only read-only views of server state plus transient UI state.

pub mod api;
pub mod config;
pub mod controller;
pub mod tui;
