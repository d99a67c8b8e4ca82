//! Messages between the controller, the input layer, and the API runner.
//!
//! `UiEvent` flows in from key handling, `Command` flows out to the
//! runner, and each finished request comes back as an `ApiResponse`.
//! List-populating commands carry a per-view token; the controller only
//! applies the response matching the latest token it issued (§ stale
//! responses are discarded, never rendered).

use std::path::PathBuf;

use crate::api::{ApiError, OverviewPoint, Run, TrendPoint, UploadRequest};

use super::state::ChartMode;

/// Which tab's selector pair a request belongs to. The Dashboard and
/// Analytics tabs hold independent app/release selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Dashboard,
    Analytics,
}

/// A user action with dashboard semantics. Pure chrome (focus moves,
/// scrolling, text editing) never reaches the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// App picked (or unset) in one scope's selector.
    SelectApp { scope: Scope, app: Option<String> },
    /// Release picked (or unset) in one scope's selector.
    SelectRelease { scope: Scope, release: Option<String> },
    LoadRuns,
    SubmitUpload,
    /// Open the report viewer for a run's `htmlPath` key.
    OpenReport { key: String },
    CloseViewer,
    /// Save the artifact behind a key to the download directory.
    Download { key: String },
    SetChartMode(ChartMode),
    LoadChart,
    RequestDeleteRun { run_id: String },
    RequestDeleteRelease,
    RequestDeleteApp,
    /// Answer to the pending delete confirmation.
    ConfirmPending,
    CancelPending,
}

/// An API call for the runner to execute on a spawned task.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchApps {
        scope: Scope,
        token: u64,
    },
    FetchReleases {
        scope: Scope,
        app_id: String,
        token: u64,
    },
    FetchRuns {
        app_id: String,
        release: Option<String>,
        token: u64,
    },
    Upload {
        request: UploadRequest,
    },
    FetchReport {
        key: String,
        token: u64,
    },
    Download {
        key: String,
    },
    FetchOverview {
        app_id: String,
        from: String,
        to: String,
        token: u64,
    },
    FetchTrend {
        app_id: String,
        release: String,
        from: String,
        to: String,
        token: u64,
    },
    DeleteRun {
        run_id: String,
    },
    DeleteRelease {
        app_id: String,
        release: String,
    },
    DeleteApp {
        app_id: String,
    },
}

/// The completion of a `Command`, fed back into the controller.
#[derive(Debug)]
pub enum ApiResponse {
    Apps {
        scope: Scope,
        token: u64,
        result: Result<Vec<String>, ApiError>,
    },
    Releases {
        scope: Scope,
        token: u64,
        result: Result<Vec<String>, ApiError>,
    },
    Runs {
        token: u64,
        result: Result<Vec<Run>, ApiError>,
    },
    Upload {
        result: Result<(), ApiError>,
    },
    Report {
        token: u64,
        result: Result<String, ApiError>,
    },
    Downloaded {
        result: Result<PathBuf, ApiError>,
    },
    Overview {
        token: u64,
        result: Result<Vec<OverviewPoint>, ApiError>,
    },
    Trend {
        token: u64,
        result: Result<Vec<TrendPoint>, ApiError>,
    },
    RunDeleted {
        result: Result<(), ApiError>,
    },
    ReleaseDeleted {
        result: Result<(), ApiError>,
    },
    AppDeleted {
        result: Result<(), ApiError>,
    },
}
