//! TuiApp — the terminal chrome around `DashboardController`.
//!
//! The controller owns every piece of dashboard state; this layer adds
//! only what the terminal needs on top: the active tab, pane focus,
//! list cursors, and viewer scroll. Update receives TuiMessages and
//! routes them; view reads state to produce ratatui widgets.

use crate::controller::DashboardController;

use super::event::TuiMessage;

/// Which tab is currently visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveTab {
    Dashboard, // Ctrl+1, default
    Analytics, // Ctrl+2
}

/// Which pane has focus within the Dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashFocus {
    Apps,
    Releases,
    Runs,
    Upload,
}

/// Which pane has focus within the Analytics tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsFocus {
    Apps,
    Releases,
    FromDate,
    ToDate,
}

/// Which upload form field is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadField {
    AppId,
    Release,
    Date,
    File,
}

impl UploadField {
    pub fn next(self) -> Self {
        match self {
            UploadField::AppId => UploadField::Release,
            UploadField::Release => UploadField::Date,
            UploadField::Date => UploadField::File,
            UploadField::File => UploadField::AppId,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            UploadField::AppId => UploadField::File,
            UploadField::Release => UploadField::AppId,
            UploadField::Date => UploadField::Release,
            UploadField::File => UploadField::Date,
        }
    }
}

/// The main TUI application state.
pub struct TuiApp {
    /// Dashboard semantics and data.
    pub controller: DashboardController,
    /// Server base URL, for the status bar.
    pub server: String,
    pub active_tab: ActiveTab,
    pub should_quit: bool,
    pub dash_focus: DashFocus,
    pub analytics_focus: AnalyticsFocus,
    pub upload_field: UploadField,
    /// Highlight cursors, one per list.
    pub apps_cursor: usize,
    pub releases_cursor: usize,
    pub an_apps_cursor: usize,
    pub an_releases_cursor: usize,
    pub runs_cursor: usize,
    /// Scroll offset of the report viewer pane.
    pub viewer_scroll: u16,
}

impl TuiApp {
    pub fn new(controller: DashboardController, server: String) -> Self {
        Self {
            controller,
            server,
            active_tab: ActiveTab::Dashboard,
            should_quit: false,
            dash_focus: DashFocus::Apps,
            analytics_focus: AnalyticsFocus::Apps,
            upload_field: UploadField::AppId,
            apps_cursor: 0,
            releases_cursor: 0,
            an_apps_cursor: 0,
            an_releases_cursor: 0,
            runs_cursor: 0,
            viewer_scroll: 0,
        }
    }

    /// Handle a TUI message.
    pub fn update(&mut self, msg: TuiMessage) {
        match msg {
            TuiMessage::Input(key) => super::input::handle_key(self, key),
            TuiMessage::Api(response) => {
                self.controller.apply(response);
                self.clamp_cursors();
            }
            TuiMessage::Tick => self.controller.tick(),
            TuiMessage::Quit => self.should_quit = true,
        }
    }

    /// Advance pane focus within the active tab.
    pub fn cycle_focus(&mut self) {
        match self.active_tab {
            ActiveTab::Dashboard => {
                self.dash_focus = match self.dash_focus {
                    DashFocus::Apps => DashFocus::Releases,
                    DashFocus::Releases => DashFocus::Runs,
                    DashFocus::Runs => DashFocus::Upload,
                    DashFocus::Upload => DashFocus::Apps,
                };
            }
            ActiveTab::Analytics => {
                self.analytics_focus = match self.analytics_focus {
                    AnalyticsFocus::Apps => {
                        // The release selector is skipped entirely while
                        // the chart mode makes it meaningless.
                        if self.controller.release_enabled {
                            AnalyticsFocus::Releases
                        } else {
                            AnalyticsFocus::FromDate
                        }
                    }
                    AnalyticsFocus::Releases => AnalyticsFocus::FromDate,
                    AnalyticsFocus::FromDate => AnalyticsFocus::ToDate,
                    AnalyticsFocus::ToDate => AnalyticsFocus::Apps,
                };
            }
        }
    }

    /// Whether the focused pane consumes plain character input.
    pub fn is_editing(&self) -> bool {
        match self.active_tab {
            ActiveTab::Dashboard => self.dash_focus == DashFocus::Upload,
            ActiveTab::Analytics => matches!(
                self.analytics_focus,
                AnalyticsFocus::FromDate | AnalyticsFocus::ToDate
            ),
        }
    }

    /// Move the focused cursor up.
    pub fn move_up(&mut self) {
        if let Some(cursor) = self.focused_cursor() {
            *cursor = cursor.saturating_sub(1);
        } else if self.dash_focus == DashFocus::Upload
            && self.active_tab == ActiveTab::Dashboard
        {
            self.upload_field = self.upload_field.prev();
        }
    }

    /// Move the focused cursor down.
    pub fn move_down(&mut self) {
        let max = self.focused_list_len().saturating_sub(1);
        if let Some(cursor) = self.focused_cursor() {
            if *cursor < max {
                *cursor += 1;
            }
        } else if self.dash_focus == DashFocus::Upload
            && self.active_tab == ActiveTab::Dashboard
        {
            self.upload_field = self.upload_field.next();
        }
    }

    fn focused_list_len(&self) -> usize {
        match (self.active_tab, self.dash_focus, self.analytics_focus) {
            (ActiveTab::Dashboard, DashFocus::Apps, _) => self.controller.dashboard.apps.len(),
            (ActiveTab::Dashboard, DashFocus::Releases, _) => {
                self.controller.dashboard.releases.len()
            }
            (ActiveTab::Dashboard, DashFocus::Runs, _) => self.controller.runs.len(),
            (ActiveTab::Analytics, _, AnalyticsFocus::Apps) => self.controller.analytics.apps.len(),
            (ActiveTab::Analytics, _, AnalyticsFocus::Releases) => {
                self.controller.analytics.releases.len()
            }
            _ => 0,
        }
    }

    fn focused_cursor(&mut self) -> Option<&mut usize> {
        match (self.active_tab, self.dash_focus, self.analytics_focus) {
            (ActiveTab::Dashboard, DashFocus::Apps, _) => Some(&mut self.apps_cursor),
            (ActiveTab::Dashboard, DashFocus::Releases, _) => Some(&mut self.releases_cursor),
            (ActiveTab::Dashboard, DashFocus::Runs, _) => Some(&mut self.runs_cursor),
            (ActiveTab::Analytics, _, AnalyticsFocus::Apps) => Some(&mut self.an_apps_cursor),
            (ActiveTab::Analytics, _, AnalyticsFocus::Releases) => {
                Some(&mut self.an_releases_cursor)
            }
            _ => None,
        }
    }

    /// Keep cursors inside their lists after data changes.
    pub fn clamp_cursors(&mut self) {
        let c = &self.controller;
        self.apps_cursor = self.apps_cursor.min(c.dashboard.apps.len().saturating_sub(1));
        self.releases_cursor = self
            .releases_cursor
            .min(c.dashboard.releases.len().saturating_sub(1));
        self.an_apps_cursor = self
            .an_apps_cursor
            .min(c.analytics.apps.len().saturating_sub(1));
        self.an_releases_cursor = self
            .an_releases_cursor
            .min(c.analytics.releases.len().saturating_sub(1));
        self.runs_cursor = self.runs_cursor.min(c.runs.len().saturating_sub(1));
    }

    /// The run row under the cursor, if any.
    pub fn selected_run(&self) -> Option<&crate::api::Run> {
        self.controller.runs.get(self.runs_cursor)
    }

    /// Mutable buffer of the focused upload form field.
    pub fn upload_buffer_mut(&mut self) -> &mut String {
        let form = &mut self.controller.upload;
        match self.upload_field {
            UploadField::AppId => &mut form.app_id,
            UploadField::Release => &mut form.release,
            UploadField::Date => &mut form.execution_date,
            UploadField::File => &mut form.file,
        }
    }

    /// Mutable buffer of the focused analytics date field, if one is
    /// focused.
    pub fn date_buffer_mut(&mut self) -> Option<&mut String> {
        match self.analytics_focus {
            AnalyticsFocus::FromDate => Some(&mut self.controller.from_date),
            AnalyticsFocus::ToDate => Some(&mut self.controller.to_date),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ApiResponse, ChartMode, Scope, UiEvent};
    use url::Url;

    fn app() -> TuiApp {
        let controller = DashboardController::new(
            Url::parse("http://localhost:8080").unwrap(),
            false,
        );
        TuiApp::new(controller, "http://localhost:8080".into())
    }

    #[test]
    fn default_state() {
        let app = app();
        assert_eq!(app.active_tab, ActiveTab::Dashboard);
        assert_eq!(app.dash_focus, DashFocus::Apps);
        assert!(!app.should_quit);
    }

    #[test]
    fn dashboard_focus_cycles() {
        let mut app = app();
        app.cycle_focus();
        assert_eq!(app.dash_focus, DashFocus::Releases);
        app.cycle_focus();
        assert_eq!(app.dash_focus, DashFocus::Runs);
        app.cycle_focus();
        assert_eq!(app.dash_focus, DashFocus::Upload);
        app.cycle_focus();
        assert_eq!(app.dash_focus, DashFocus::Apps);
    }

    #[test]
    fn analytics_focus_skips_disabled_release_selector() {
        let mut app = app();
        app.active_tab = ActiveTab::Analytics;

        // Default mode is AppOverview: release selector disabled.
        assert!(!app.controller.release_enabled);
        app.cycle_focus();
        assert_eq!(app.analytics_focus, AnalyticsFocus::FromDate);

        app.analytics_focus = AnalyticsFocus::Apps;
        app.controller
            .handle(UiEvent::SetChartMode(ChartMode::ReleaseTrend));
        app.cycle_focus();
        assert_eq!(app.analytics_focus, AnalyticsFocus::Releases);
    }

    #[test]
    fn move_clamped_to_list() {
        let mut app = app();
        app.controller.dashboard.apps = vec!["a".into(), "b".into()];
        app.move_down();
        assert_eq!(app.apps_cursor, 1);
        app.move_down();
        assert_eq!(app.apps_cursor, 1);
        app.move_up();
        assert_eq!(app.apps_cursor, 0);
        app.move_up();
        assert_eq!(app.apps_cursor, 0);
    }

    #[test]
    fn upload_field_cycle_on_arrows() {
        let mut app = app();
        app.dash_focus = DashFocus::Upload;
        app.move_down();
        assert_eq!(app.upload_field, UploadField::Release);
        app.move_up();
        assert_eq!(app.upload_field, UploadField::AppId);
        app.move_up();
        assert_eq!(app.upload_field, UploadField::File);
    }

    #[test]
    fn api_message_routes_to_controller_and_clamps() {
        let mut app = app();
        app.controller.dashboard.apps = vec!["a".into(), "b".into(), "c".into()];
        app.apps_cursor = 2;

        app.controller.init();
        let token = app
            .controller
            .take_commands()
            .iter()
            .find_map(|c| match c {
                crate::controller::Command::FetchApps {
                    scope: Scope::Dashboard,
                    token,
                } => Some(*token),
                _ => None,
            })
            .unwrap();
        app.update(TuiMessage::Api(ApiResponse::Apps {
            scope: Scope::Dashboard,
            token,
            result: Ok(vec!["only".into()]),
        }));
        assert_eq!(app.controller.dashboard.apps.len(), 1);
        assert_eq!(app.apps_cursor, 0);
    }

    #[test]
    fn quit_message() {
        let mut app = app();
        app.update(TuiMessage::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn upload_buffer_follows_focused_field() {
        let mut app = app();
        app.dash_focus = DashFocus::Upload;
        app.upload_buffer_mut().push_str("svc-a");
        assert_eq!(app.controller.upload.app_id, "svc-a");

        app.upload_field = UploadField::File;
        app.upload_buffer_mut().push_str("r.zip");
        assert_eq!(app.controller.upload.file, "r.zip");
    }
}
