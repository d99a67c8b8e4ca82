//! DashboardController — the dashboard's TEA model.
//!
//! All view state lives here. `handle` receives user events, mutates
//! state, and queues `Command`s for the runner; `apply` receives each
//! command's `ApiResponse` and reshapes exactly one view's data. The
//! render layer reads state, never mutates it.
//!
//! Every list-populating request carries a per-view token from a
//! monotonic counter. A response is applied only if its token is the
//! latest issued for that view, so a slow superseded fetch can never
//! overwrite newer state.

pub mod chart;
pub mod command;
pub mod state;

use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, warn};
use url::Url;

use crate::api::client::endpoints;
use crate::api::{ApiError, Run, UploadRequest};

pub use chart::{ChartGroup, ChartModel};
pub use command::{ApiResponse, Command, Scope, UiEvent};
pub use state::{
    ChartMode, DeleteTarget, ReportContent, SelectorState, Toast, ToastKind, UploadForm,
    ViewerState,
};

/// Latest issued request token per view.
#[derive(Debug, Default)]
struct Tokens {
    dashboard_apps: u64,
    dashboard_releases: u64,
    analytics_apps: u64,
    analytics_releases: u64,
    runs: u64,
    report: u64,
    chart: u64,
}

impl Tokens {
    fn apps_mut(&mut self, scope: Scope) -> &mut u64 {
        match scope {
            Scope::Dashboard => &mut self.dashboard_apps,
            Scope::Analytics => &mut self.analytics_apps,
        }
    }

    fn releases_mut(&mut self, scope: Scope) -> &mut u64 {
        match scope {
            Scope::Dashboard => &mut self.dashboard_releases,
            Scope::Analytics => &mut self.analytics_releases,
        }
    }

    fn apps(&self, scope: Scope) -> u64 {
        match scope {
            Scope::Dashboard => self.dashboard_apps,
            Scope::Analytics => self.analytics_apps,
        }
    }

    fn releases(&self, scope: Scope) -> u64 {
        match scope {
            Scope::Dashboard => self.dashboard_releases,
            Scope::Analytics => self.analytics_releases,
        }
    }
}

fn next(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

/// Owns all dashboard state and the rules for mutating it.
pub struct DashboardController {
    /// Dashboard-tab app/release selectors.
    pub dashboard: SelectorState,
    /// Analytics-tab app/release selectors.
    pub analytics: SelectorState,
    /// Loaded run rows, in server order.
    pub runs: Vec<Run>,
    pub upload: UploadForm,
    pub viewer: ViewerState,
    pub chart_mode: ChartMode,
    /// Whether the analytics release selector accepts input. Always
    /// false in `AppOverview`, true in `ReleaseTrend`.
    pub release_enabled: bool,
    pub from_date: String,
    pub to_date: String,
    /// The one live chart. Replaced wholesale; a new load clears it
    /// before the fetch is issued.
    pub chart: Option<ChartModel>,
    pub chart_loading: bool,
    pub toast: Option<Toast>,
    pub pending_delete: Option<DeleteTarget>,

    base: Url,
    release_optional: bool,
    tokens: Tokens,
    queue: Vec<Command>,
}

impl DashboardController {
    pub fn new(base: Url, release_optional: bool) -> Self {
        let mut controller = Self {
            dashboard: SelectorState::default(),
            analytics: SelectorState::default(),
            runs: Vec::new(),
            upload: UploadForm::default(),
            viewer: ViewerState::default(),
            chart_mode: ChartMode::AppOverview,
            release_enabled: false,
            from_date: String::new(),
            to_date: String::new(),
            chart: None,
            chart_loading: false,
            toast: None,
            pending_delete: None,
            base,
            release_optional,
            tokens: Tokens::default(),
            queue: Vec::new(),
        };
        controller.set_mode(ChartMode::AppOverview);
        controller
    }

    /// Queue the page-load fetches: app lists for both tabs.
    pub fn init(&mut self) {
        self.refresh_app_lists();
    }

    /// Drain queued commands for the runner to execute.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.queue)
    }

    pub fn selector(&self, scope: Scope) -> &SelectorState {
        match scope {
            Scope::Dashboard => &self.dashboard,
            Scope::Analytics => &self.analytics,
        }
    }

    fn selector_mut(&mut self, scope: Scope) -> &mut SelectorState {
        match scope {
            Scope::Dashboard => &mut self.dashboard,
            Scope::Analytics => &mut self.analytics,
        }
    }

    /// Handle a user event (TEA update).
    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::SelectApp { scope, app } => self.select_app(scope, app),
            UiEvent::SelectRelease { scope, release } => self.select_release(scope, release),
            UiEvent::LoadRuns => self.load_runs(),
            UiEvent::SubmitUpload => self.submit_upload(),
            UiEvent::OpenReport { key } => self.open_report(key),
            UiEvent::CloseViewer => self.viewer.hide(),
            UiEvent::Download { key } => self.queue.push(Command::Download { key }),
            UiEvent::SetChartMode(mode) => self.set_mode(mode),
            UiEvent::LoadChart => self.load_chart(),
            UiEvent::RequestDeleteRun { run_id } => {
                self.pending_delete = Some(DeleteTarget::Run { run_id });
            }
            UiEvent::RequestDeleteRelease => self.request_delete_release(),
            UiEvent::RequestDeleteApp => self.request_delete_app(),
            UiEvent::ConfirmPending => self.confirm_pending(),
            UiEvent::CancelPending => self.pending_delete = None,
        }
    }

    fn select_app(&mut self, scope: Scope, app: Option<String>) {
        let app = app.filter(|a| !a.is_empty());

        let selector = self.selector_mut(scope);
        selector.selected_app = app.clone();
        selector.clear_releases();

        // Invalidate any in-flight releases fetch for this scope; the
        // same token is reused if a new fetch goes out below.
        let token = next(self.tokens.releases_mut(scope));

        if scope == Scope::Dashboard {
            self.clear_runs_view();
        }

        if let Some(app_id) = app {
            self.queue.push(Command::FetchReleases {
                scope,
                app_id,
                token,
            });
        }
    }

    fn select_release(&mut self, scope: Scope, release: Option<String>) {
        let release = release.filter(|r| !r.is_empty());
        self.selector_mut(scope).selected_release = release;
        if scope == Scope::Dashboard {
            self.clear_runs_view();
        }
    }

    /// Empty the run table and hide the viewer, invalidating any
    /// in-flight runs fetch.
    fn clear_runs_view(&mut self) {
        self.runs.clear();
        next(&mut self.tokens.runs);
        self.viewer.hide();
    }

    fn load_runs(&mut self) {
        let Some(app_id) = self.dashboard.selected_app.clone() else {
            let msg = if self.release_optional {
                "Select app"
            } else {
                "Select app and release"
            };
            self.toast_error(msg);
            return;
        };
        let release = self.dashboard.selected_release.clone();
        if release.is_none() && !self.release_optional {
            self.toast_error("Select app and release");
            return;
        }

        let token = next(&mut self.tokens.runs);
        self.queue.push(Command::FetchRuns {
            app_id,
            release,
            token,
        });
    }

    fn submit_upload(&mut self) {
        if self.upload.in_flight {
            return;
        }
        if let Some(msg) = self.upload.missing_field() {
            self.toast_error(msg);
            return;
        }
        self.upload.in_flight = true;
        self.queue.push(Command::Upload {
            request: UploadRequest {
                app_id: self.upload.app_id.trim().to_string(),
                release: self.upload.release.trim().to_string(),
                execution_date: self.upload.execution_date.trim().to_string(),
                file: self.upload.file.trim().to_string(),
            },
        });
    }

    fn open_report(&mut self, key: String) {
        self.viewer.visible = true;
        self.viewer.key = Some(key.clone());
        // Recorded before the content fetch so the download option works
        // even if the fetch fails.
        self.viewer.download_url = Some(endpoints::download(&self.base, &key).to_string());
        self.viewer.content = Some(ReportContent::Loading);

        let token = next(&mut self.tokens.report);
        self.queue.push(Command::FetchReport { key, token });
    }

    fn set_mode(&mut self, mode: ChartMode) {
        self.chart_mode = mode;
        self.release_enabled = mode == ChartMode::ReleaseTrend;
    }

    fn load_chart(&mut self) {
        let Some(app_id) = self.analytics.selected_app.clone() else {
            self.toast_error("Select app");
            return;
        };
        let from = self.from_date.trim().to_string();
        let to = self.to_date.trim().to_string();
        if from.is_empty() || to.is_empty() {
            self.toast_error("Select From and To dates");
            return;
        }
        if NaiveDate::parse_from_str(&from, "%Y-%m-%d").is_err()
            || NaiveDate::parse_from_str(&to, "%Y-%m-%d").is_err()
        {
            self.toast_error("Dates must be YYYY-MM-DD");
            return;
        }

        let release = match self.chart_mode {
            ChartMode::AppOverview => None,
            ChartMode::ReleaseTrend => {
                let Some(release) = self.analytics.selected_release.clone() else {
                    self.toast_error("Select Release");
                    return;
                };
                Some(release)
            }
        };

        // Destroy before create: the previous chart goes away as soon as
        // a new load is issued.
        self.chart = None;
        self.chart_loading = true;
        let token = next(&mut self.tokens.chart);
        match release {
            None => self.queue.push(Command::FetchOverview {
                app_id,
                from,
                to,
                token,
            }),
            Some(release) => self.queue.push(Command::FetchTrend {
                app_id,
                release,
                from,
                to,
                token,
            }),
        }
    }

    fn request_delete_release(&mut self) {
        match (
            self.dashboard.selected_app.clone(),
            self.dashboard.selected_release.clone(),
        ) {
            (Some(app_id), Some(release)) => {
                self.pending_delete = Some(DeleteTarget::Release { app_id, release });
            }
            _ => self.toast_error("Select app and release"),
        }
    }

    fn request_delete_app(&mut self) {
        match self.dashboard.selected_app.clone() {
            Some(app_id) => self.pending_delete = Some(DeleteTarget::App { app_id }),
            None => self.toast_error("Select app"),
        }
    }

    fn confirm_pending(&mut self) {
        let Some(target) = self.pending_delete.take() else {
            return;
        };
        match target {
            DeleteTarget::Run { run_id } => self.queue.push(Command::DeleteRun { run_id }),
            DeleteTarget::Release { app_id, release } => {
                self.queue.push(Command::DeleteRelease { app_id, release })
            }
            DeleteTarget::App { app_id } => self.queue.push(Command::DeleteApp { app_id }),
        }
    }

    /// Apply a finished API call to the view it belongs to.
    pub fn apply(&mut self, response: ApiResponse) {
        match response {
            ApiResponse::Apps {
                scope,
                token,
                result,
            } => self.apply_apps(scope, token, result),
            ApiResponse::Releases {
                scope,
                token,
                result,
            } => self.apply_releases(scope, token, result),
            ApiResponse::Runs { token, result } => self.apply_runs(token, result),
            ApiResponse::Upload { result } => self.apply_upload(result),
            ApiResponse::Report { token, result } => self.apply_report(token, result),
            ApiResponse::Downloaded { result } => match result {
                Ok(path) => self.toast_success(format!("Saved {}", path.display())),
                Err(e) => {
                    warn!("download failed: {e}");
                    self.toast_error("Download failed");
                }
            },
            ApiResponse::Overview { token, result } => {
                self.apply_chart(token, result.map(|points| ChartModel::overview(&points)))
            }
            ApiResponse::Trend { token, result } => {
                self.apply_chart(token, result.map(|points| ChartModel::trend(&points)))
            }
            ApiResponse::RunDeleted { result } => self.apply_deleted(result, "Run deleted"),
            ApiResponse::ReleaseDeleted { result } => {
                self.apply_deleted(result, "Release deleted")
            }
            ApiResponse::AppDeleted { result } => self.apply_deleted(result, "App deleted"),
        }
    }

    fn apply_apps(&mut self, scope: Scope, token: u64, result: Result<Vec<String>, ApiError>) {
        if token != self.tokens.apps(scope) {
            debug!("discarding stale apps response for {scope:?}");
            return;
        }
        match result {
            Ok(apps) => {
                // A fresh app list resets everything below it, exactly
                // like the page-load population.
                next(self.tokens.releases_mut(scope));
                let selector = self.selector_mut(scope);
                selector.apps = apps;
                selector.clear_selection();
                if scope == Scope::Dashboard {
                    self.clear_runs_view();
                }
            }
            Err(e) => {
                warn!("apps fetch failed: {e}");
                self.toast_error("Failed to load apps");
            }
        }
    }

    fn apply_releases(
        &mut self,
        scope: Scope,
        token: u64,
        result: Result<Vec<String>, ApiError>,
    ) {
        if token != self.tokens.releases(scope) {
            debug!("discarding stale releases response for {scope:?}");
            return;
        }
        match result {
            Ok(releases) => self.selector_mut(scope).releases = releases,
            Err(e) => {
                warn!("releases fetch failed: {e}");
                self.toast_error("Failed to load releases");
            }
        }
    }

    fn apply_runs(&mut self, token: u64, result: Result<Vec<Run>, ApiError>) {
        if token != self.tokens.runs {
            debug!("discarding stale runs response");
            return;
        }
        match result {
            Ok(runs) => {
                self.runs = runs;
                self.viewer.hide();
            }
            Err(e) => {
                warn!("runs fetch failed: {e}");
                self.toast_error("Failed to load runs");
            }
        }
    }

    fn apply_upload(&mut self, result: Result<(), ApiError>) {
        self.upload.in_flight = false;
        match result {
            Ok(()) => {
                self.toast_success("Uploaded");
                self.upload.clear_fields();
                self.refresh_app_lists();
            }
            Err(e) => {
                warn!("upload failed: {e}");
                let msg = match e {
                    ApiError::Network(_) => "Upload failed (network)".to_string(),
                    ApiError::Status { message, .. } => message,
                    ApiError::Rejected(message) => message,
                    other => other.to_string(),
                };
                self.toast_error(msg);
            }
        }
    }

    fn apply_report(&mut self, token: u64, result: Result<String, ApiError>) {
        if token != self.tokens.report {
            debug!("discarding stale report response");
            return;
        }
        self.viewer.content = Some(match result {
            Ok(html) => ReportContent::Loaded(html),
            Err(ApiError::Status { status, .. }) => {
                ReportContent::Failed(format!("Report not found ({status})"))
            }
            Err(e) => {
                warn!("report fetch failed: {e}");
                ReportContent::Failed("Failed to load report".into())
            }
        });
    }

    fn apply_chart(&mut self, token: u64, result: Result<ChartModel, ApiError>) {
        if token != self.tokens.chart {
            debug!("discarding stale chart response");
            return;
        }
        self.chart_loading = false;
        match result {
            Ok(model) => self.chart = Some(model),
            Err(e) => {
                warn!("chart fetch failed: {e}");
                let msg = match e {
                    ApiError::Status { .. } => "No data for selected range",
                    ApiError::Shape(_) => "Invalid chart data",
                    _ => "Failed to load chart",
                };
                self.toast_error(msg);
            }
        }
    }

    fn apply_deleted(&mut self, result: Result<(), ApiError>, success_msg: &str) {
        match result {
            Ok(()) => {
                self.toast_success(success_msg);
                self.clear_runs_view();
                self.refresh_app_lists();
            }
            Err(e) => {
                warn!("delete failed: {e}");
                self.toast_error("Delete failed");
            }
        }
    }

    /// Re-fetch the app selectors of both tabs. The one place the
    /// Dashboard and Analytics views are synchronized.
    fn refresh_app_lists(&mut self) {
        for scope in [Scope::Dashboard, Scope::Analytics] {
            let token = next(self.tokens.apps_mut(scope));
            self.queue.push(Command::FetchApps { scope, token });
        }
    }

    /// Periodic housekeeping: expire the toast.
    pub fn tick(&mut self) {
        if let Some(toast) = &self.toast {
            if Instant::now() >= toast.expires_at {
                self.toast = None;
            }
        }
    }

    fn toast_error(&mut self, text: impl Into<String>) {
        self.toast = Some(Toast::new(text, ToastKind::Error));
    }

    fn toast_success(&mut self, text: impl Into<String>) {
        self.toast = Some(Toast::new(text, ToastKind::Success));
    }
}
