//! Key binding dispatch for the TUI.
//!
//! Modal surfaces win first (delete confirmation, report viewer), then
//! global bindings, then the focused pane of the active tab. Panes that
//! edit text (upload form, date filters) consume plain characters, so
//! plain `q`/`1`/`2` only act outside them.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::controller::{ChartMode, Scope, UiEvent};

use super::app::{ActiveTab, AnalyticsFocus, DashFocus, TuiApp};

/// Handle a key event, mutating app state.
pub fn handle_key(app: &mut TuiApp, key: KeyEvent) {
    // Ctrl+C always quits.
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Delete confirmation modal swallows everything else.
    if app.controller.pending_delete.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                app.controller.handle(UiEvent::ConfirmPending)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.controller.handle(UiEvent::CancelPending)
            }
            _ => {}
        }
        return;
    }

    // Report viewer overlay.
    if app.controller.viewer.visible {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => app.controller.handle(UiEvent::CloseViewer),
            KeyCode::Up => app.viewer_scroll = app.viewer_scroll.saturating_sub(1),
            KeyCode::Down => app.viewer_scroll = app.viewer_scroll.saturating_add(1),
            KeyCode::PageUp => app.viewer_scroll = app.viewer_scroll.saturating_sub(10),
            KeyCode::PageDown => app.viewer_scroll = app.viewer_scroll.saturating_add(10),
            KeyCode::Home => app.viewer_scroll = 0,
            KeyCode::Char('s') => {
                let key = app.controller.viewer.key.clone();
                if let Some(key) = key {
                    app.controller.handle(UiEvent::Download { key });
                }
            }
            _ => {}
        }
        return;
    }

    // Global bindings.
    match key.code {
        KeyCode::Char('1')
            if key.modifiers.contains(KeyModifiers::CONTROL) || !app.is_editing() =>
        {
            app.active_tab = ActiveTab::Dashboard;
            return;
        }
        KeyCode::Char('2')
            if key.modifiers.contains(KeyModifiers::CONTROL) || !app.is_editing() =>
        {
            app.active_tab = ActiveTab::Analytics;
            return;
        }
        KeyCode::Char('q') if !app.is_editing() => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab => {
            app.cycle_focus();
            return;
        }
        KeyCode::Up | KeyCode::Char('k') if !app.is_editing() => {
            app.move_up();
            return;
        }
        KeyCode::Down | KeyCode::Char('j') if !app.is_editing() => {
            app.move_down();
            return;
        }
        KeyCode::Up | KeyCode::Down => {
            // Arrow keys still move between upload fields while editing.
            if key.code == KeyCode::Up {
                app.move_up();
            } else {
                app.move_down();
            }
            return;
        }
        _ => {}
    }

    match app.active_tab {
        ActiveTab::Dashboard => handle_dashboard(app, key),
        ActiveTab::Analytics => handle_analytics(app, key),
    }
}

fn handle_dashboard(app: &mut TuiApp, key: KeyEvent) {
    match app.dash_focus {
        DashFocus::Apps => match key.code {
            KeyCode::Enter => {
                let picked = app.controller.dashboard.apps.get(app.apps_cursor).cloned();
                app.controller.handle(UiEvent::SelectApp {
                    scope: Scope::Dashboard,
                    app: picked,
                });
                app.releases_cursor = 0;
                app.runs_cursor = 0;
            }
            KeyCode::Char('D') => app.controller.handle(UiEvent::RequestDeleteApp),
            _ => {}
        },
        DashFocus::Releases => match key.code {
            KeyCode::Enter => {
                let picked = app
                    .controller
                    .dashboard
                    .releases
                    .get(app.releases_cursor)
                    .cloned();
                app.controller.handle(UiEvent::SelectRelease {
                    scope: Scope::Dashboard,
                    release: picked,
                });
                app.runs_cursor = 0;
            }
            KeyCode::Char('l') => app.controller.handle(UiEvent::LoadRuns),
            KeyCode::Char('D') => app.controller.handle(UiEvent::RequestDeleteRelease),
            _ => {}
        },
        DashFocus::Runs => match key.code {
            KeyCode::Char('l') => app.controller.handle(UiEvent::LoadRuns),
            KeyCode::Enter | KeyCode::Char('v') => {
                let picked = app.selected_run().map(|r| r.html_path.clone());
                if let Some(key) = picked {
                    app.viewer_scroll = 0;
                    app.controller.handle(UiEvent::OpenReport { key });
                }
            }
            KeyCode::Char('s') => {
                let picked = app.selected_run().map(|r| r.html_path.clone());
                if let Some(key) = picked {
                    app.controller.handle(UiEvent::Download { key });
                }
            }
            KeyCode::Char('d') => {
                let picked = app.selected_run().map(|r| r.run_id.clone());
                if let Some(run_id) = picked {
                    app.controller.handle(UiEvent::RequestDeleteRun { run_id });
                }
            }
            _ => {}
        },
        DashFocus::Upload => match key.code {
            KeyCode::Enter => app.controller.handle(UiEvent::SubmitUpload),
            KeyCode::Backspace => {
                app.upload_buffer_mut().pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.upload_buffer_mut().push(c);
            }
            _ => {}
        },
    }
}

fn handle_analytics(app: &mut TuiApp, key: KeyEvent) {
    // Date filters take digits and dashes only; everything else falls
    // through to the bindings below.
    if let KeyCode::Char(c) = key.code {
        if c.is_ascii_digit() || c == '-' {
            if let Some(buf) = app.date_buffer_mut() {
                buf.push(c);
                return;
            }
        }
    }
    if key.code == KeyCode::Backspace {
        if let Some(buf) = app.date_buffer_mut() {
            buf.pop();
            return;
        }
    }

    match key.code {
        KeyCode::Char('m') => {
            let next = match app.controller.chart_mode {
                ChartMode::AppOverview => ChartMode::ReleaseTrend,
                ChartMode::ReleaseTrend => ChartMode::AppOverview,
            };
            app.controller.handle(UiEvent::SetChartMode(next));
            // Focus can't stay on a selector that just got disabled.
            if !app.controller.release_enabled
                && app.analytics_focus == AnalyticsFocus::Releases
            {
                app.analytics_focus = AnalyticsFocus::FromDate;
            }
        }
        KeyCode::Char('g') => app.controller.handle(UiEvent::LoadChart),
        KeyCode::Enter => match app.analytics_focus {
            AnalyticsFocus::Apps => {
                let picked = app
                    .controller
                    .analytics
                    .apps
                    .get(app.an_apps_cursor)
                    .cloned();
                app.controller.handle(UiEvent::SelectApp {
                    scope: Scope::Analytics,
                    app: picked,
                });
                app.an_releases_cursor = 0;
            }
            AnalyticsFocus::Releases if app.controller.release_enabled => {
                let picked = app
                    .controller
                    .analytics
                    .releases
                    .get(app.an_releases_cursor)
                    .cloned();
                app.controller.handle(UiEvent::SelectRelease {
                    scope: Scope::Analytics,
                    release: picked,
                });
            }
            _ => app.controller.handle(UiEvent::LoadChart),
        },
        _ => {}
    }
}
