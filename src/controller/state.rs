//! Controller-owned view state.
//!
//! Every struct here is a plain data holder mutated only by
//! `DashboardController`; the render layer reads them by reference.

use std::time::{Duration, Instant};

/// Long enough to read; matches the web front-end's toast timeout.
pub const TOAST_TTL: Duration = Duration::from_millis(2500);

/// Which analytics chart is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartMode {
    /// Cross-release summary: one bar group per release.
    AppOverview,
    /// Time series within one release: one bar group per execution date.
    ReleaseTrend,
}

/// App/release pick lists plus current selection, one per scope.
#[derive(Debug, Clone, Default)]
pub struct SelectorState {
    pub apps: Vec<String>,
    pub releases: Vec<String>,
    pub selected_app: Option<String>,
    pub selected_release: Option<String>,
}

impl SelectorState {
    /// Drop the release list and selection (app switch, app-list refresh).
    pub fn clear_releases(&mut self) {
        self.releases.clear();
        self.selected_release = None;
    }

    /// Drop everything below the app list.
    pub fn clear_selection(&mut self) {
        self.selected_app = None;
        self.clear_releases();
    }
}

/// The archive upload form. Field values stay put on failure so the
/// user can retry.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub app_id: String,
    pub release: String,
    pub execution_date: String,
    pub file: String,
    pub in_flight: bool,
}

impl UploadForm {
    /// First missing required field, as a user-facing message.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.app_id.trim().is_empty() {
            Some("App id required")
        } else if self.release.trim().is_empty() {
            Some("Release required")
        } else if self.execution_date.trim().is_empty() {
            Some("Select execution date")
        } else if self.file.trim().is_empty() {
            Some("Select a report archive")
        } else {
            None
        }
    }

    pub fn clear_fields(&mut self) {
        self.app_id.clear();
        self.release.clear();
        self.execution_date.clear();
        self.file.clear();
    }
}

/// What the report viewer pane is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportContent {
    Loading,
    Loaded(String),
    Failed(String),
}

/// Report viewer pane. Closing hides it without clearing content;
/// the download URL is recorded at open time, before the content fetch
/// resolves.
#[derive(Debug, Clone, Default)]
pub struct ViewerState {
    pub visible: bool,
    pub key: Option<String>,
    pub download_url: Option<String>,
    pub content: Option<ReportContent>,
}

impl ViewerState {
    pub fn hide(&mut self) {
        self.visible = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// Transient auto-dismissing notification.
#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    pub kind: ToastKind,
    pub expires_at: Instant,
}

impl Toast {
    pub fn new(text: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            text: text.into(),
            kind,
            expires_at: Instant::now() + TOAST_TTL,
        }
    }
}

/// A destructive action awaiting explicit confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteTarget {
    Run { run_id: String },
    Release { app_id: String, release: String },
    App { app_id: String },
}

impl DeleteTarget {
    /// Prompt line for the confirmation modal.
    pub fn describe(&self) -> String {
        match self {
            DeleteTarget::Run { run_id } => format!("Delete run {run_id}?"),
            DeleteTarget::Release { app_id, release } => {
                format!("Delete release {release} of {app_id} and all its runs?")
            }
            DeleteTarget::App { app_id } => {
                format!("Delete app {app_id} and all its releases and runs?")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_form_reports_first_missing_field() {
        let mut form = UploadForm::default();
        assert_eq!(form.missing_field(), Some("App id required"));

        form.app_id = "svc-a".into();
        assert_eq!(form.missing_field(), Some("Release required"));

        form.release = "1.1".into();
        assert_eq!(form.missing_field(), Some("Select execution date"));

        form.execution_date = "2024-05-01".into();
        assert_eq!(form.missing_field(), Some("Select a report archive"));

        form.file = "report.zip".into();
        assert_eq!(form.missing_field(), None);
    }

    #[test]
    fn upload_form_whitespace_counts_as_missing() {
        let mut form = UploadForm::default();
        form.app_id = "  ".into();
        assert_eq!(form.missing_field(), Some("App id required"));
    }

    #[test]
    fn clear_fields_keeps_in_flight_flag() {
        let mut form = UploadForm {
            app_id: "a".into(),
            release: "r".into(),
            execution_date: "d".into(),
            file: "f".into(),
            in_flight: true,
        };
        form.clear_fields();
        assert!(form.app_id.is_empty());
        assert!(form.file.is_empty());
        assert!(form.in_flight);
    }

    #[test]
    fn selector_clear_releases_keeps_app() {
        let mut sel = SelectorState {
            apps: vec!["svc-a".into()],
            releases: vec!["1.0".into(), "1.1".into()],
            selected_app: Some("svc-a".into()),
            selected_release: Some("1.0".into()),
        };
        sel.clear_releases();
        assert_eq!(sel.selected_app, Some("svc-a".into()));
        assert!(sel.releases.is_empty());
        assert!(sel.selected_release.is_none());
    }

    #[test]
    fn delete_target_describe() {
        let t = DeleteTarget::Release {
            app_id: "svc-a".into(),
            release: "1.1".into(),
        };
        let text = t.describe();
        assert!(text.contains("svc-a"));
        assert!(text.contains("1.1"));
    }
}
