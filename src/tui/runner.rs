//! TUI runner — main loop that wires everything together.
//!
//! Creates the terminal, drains controller commands onto spawned API
//! tasks, and multiplexes key input, finished calls, tick and render
//! intervals. Superseded calls still complete; the controller discards
//! their responses by token.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::api::ReportApi;
use crate::controller::{ApiResponse, Command, DashboardController};

use super::app::TuiApp;
use super::event::TuiMessage;
use super::layout;

/// Turn a storage key into a filename that can't escape the download
/// directory.
fn download_file_name(key: &str) -> String {
    let name: String = key
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    if name.is_empty() {
        "artifact".to_string()
    } else {
        name
    }
}

/// Execute one command on a spawned task, reporting back over `tx`.
fn dispatch(
    command: Command,
    api: Arc<dyn ReportApi>,
    tx: mpsc::UnboundedSender<ApiResponse>,
    download_dir: PathBuf,
) {
    tokio::spawn(async move {
        let response = match command {
            Command::FetchApps { scope, token } => ApiResponse::Apps {
                scope,
                token,
                result: api.list_apps().await,
            },
            Command::FetchReleases {
                scope,
                app_id,
                token,
            } => ApiResponse::Releases {
                scope,
                token,
                result: api.list_releases(&app_id).await,
            },
            Command::FetchRuns {
                app_id,
                release,
                token,
            } => ApiResponse::Runs {
                token,
                result: api.list_runs(&app_id, release.as_deref()).await,
            },
            Command::Upload { request } => ApiResponse::Upload {
                result: api.upload(&request).await,
            },
            Command::FetchReport { key, token } => ApiResponse::Report {
                token,
                result: api.fetch_report(&key).await,
            },
            Command::Download { key } => ApiResponse::Downloaded {
                result: save_artifact(api.as_ref(), &key, &download_dir).await,
            },
            Command::FetchOverview {
                app_id,
                from,
                to,
                token,
            } => ApiResponse::Overview {
                token,
                result: api.overview_chart(&app_id, &from, &to).await,
            },
            Command::FetchTrend {
                app_id,
                release,
                from,
                to,
                token,
            } => ApiResponse::Trend {
                token,
                result: api.trend_chart(&app_id, &release, &from, &to).await,
            },
            Command::DeleteRun { run_id } => ApiResponse::RunDeleted {
                result: api.delete_run(&run_id).await,
            },
            Command::DeleteRelease { app_id, release } => ApiResponse::ReleaseDeleted {
                result: api.delete_release(&app_id, &release).await,
            },
            Command::DeleteApp { app_id } => ApiResponse::AppDeleted {
                result: api.delete_app(&app_id).await,
            },
        };
        // Receiver gone means the TUI is shutting down.
        let _ = tx.send(response);
    });
}

/// Download an artifact and write it into the download directory.
async fn save_artifact(
    api: &dyn ReportApi,
    key: &str,
    download_dir: &Path,
) -> Result<PathBuf, crate::api::ApiError> {
    let bytes = api.download(key).await?;
    let path = download_dir.join(download_file_name(key));
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

/// Drain queued controller commands onto spawned tasks.
fn pump_commands(
    app: &mut TuiApp,
    api: &Arc<dyn ReportApi>,
    tx: &mpsc::UnboundedSender<ApiResponse>,
    download_dir: &Path,
) {
    for command in app.controller.take_commands() {
        dispatch(command, api.clone(), tx.clone(), download_dir.to_path_buf());
    }
}

/// Run the TUI main loop. Blocks until quit.
pub async fn run_tui(
    api: Arc<dyn ReportApi>,
    controller: DashboardController,
    server: String,
    download_dir: PathBuf,
) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<ApiResponse>();
    let mut app = TuiApp::new(controller, server);

    // Page-load fetches.
    app.controller.init();
    pump_commands(&mut app, &api, &tx, &download_dir);

    let mut tick_interval = interval(Duration::from_millis(250)); // 4Hz
    let mut render_interval = interval(Duration::from_millis(33)); // ~30fps

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                app.update(TuiMessage::Tick);
            }
            _ = render_interval.tick() => {
                terminal.draw(|f| layout::draw(f, &mut app))?;
            }
            Some(response) = rx.recv() => {
                app.update(TuiMessage::Api(response));
            }
            // Poll crossterm events (non-blocking via tokio::task::spawn_blocking)
            result = tokio::task::spawn_blocking(|| {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    event::read().ok()
                } else {
                    None
                }
            }) => {
                if let Ok(Some(Event::Key(key))) = result {
                    app.update(TuiMessage::Input(key));
                }
            }
        }

        pump_commands(&mut app, &api, &tx, &download_dir);

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ApiResult, OverviewPoint, Run, TrendPoint, UploadRequest};
    use crate::controller::Scope;
    use async_trait::async_trait;

    /// Canned-data API for exercising dispatch without a server.
    struct MockApi;

    #[async_trait]
    impl ReportApi for MockApi {
        async fn list_apps(&self) -> ApiResult<Vec<String>> {
            Ok(vec!["svc-a".into(), "svc-b".into()])
        }

        async fn list_releases(&self, app_id: &str) -> ApiResult<Vec<String>> {
            Ok(vec![format!("{app_id}-1.0")])
        }

        async fn list_runs(&self, _app_id: &str, release: Option<&str>) -> ApiResult<Vec<Run>> {
            if release.is_none() {
                return Err(ApiError::Status {
                    status: 400,
                    message: "release required".into(),
                });
            }
            Ok(vec![])
        }

        async fn upload(&self, request: &UploadRequest) -> ApiResult<()> {
            if request.app_id == "reject" {
                Err(ApiError::Rejected("bad archive".into()))
            } else {
                Ok(())
            }
        }

        async fn fetch_report(&self, key: &str) -> ApiResult<String> {
            Ok(format!("<html>{key}</html>"))
        }

        async fn download(&self, key: &str) -> ApiResult<Vec<u8>> {
            Ok(key.as_bytes().to_vec())
        }

        async fn overview_chart(
            &self,
            _app_id: &str,
            _from: &str,
            _to: &str,
        ) -> ApiResult<Vec<OverviewPoint>> {
            Ok(vec![])
        }

        async fn trend_chart(
            &self,
            _app_id: &str,
            _release: &str,
            _from: &str,
            _to: &str,
        ) -> ApiResult<Vec<TrendPoint>> {
            Ok(vec![])
        }

        async fn delete_run(&self, _run_id: &str) -> ApiResult<()> {
            Ok(())
        }

        async fn delete_release(&self, _app_id: &str, _release: &str) -> ApiResult<()> {
            Ok(())
        }

        async fn delete_app(&self, _app_id: &str) -> ApiResult<()> {
            Ok(())
        }
    }

    fn mock() -> Arc<dyn ReportApi> {
        Arc::new(MockApi)
    }

    #[tokio::test]
    async fn dispatch_fetch_apps_reports_back() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        dispatch(
            Command::FetchApps {
                scope: Scope::Dashboard,
                token: 7,
            },
            mock(),
            tx,
            PathBuf::from("."),
        );
        match rx.recv().await.unwrap() {
            ApiResponse::Apps {
                scope: Scope::Dashboard,
                token: 7,
                result,
            } => assert_eq!(result.unwrap(), vec!["svc-a", "svc-b"]),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn dispatch_runs_error_propagates() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        dispatch(
            Command::FetchRuns {
                app_id: "svc-a".into(),
                release: None,
                token: 1,
            },
            mock(),
            tx,
            PathBuf::from("."),
        );
        match rx.recv().await.unwrap() {
            ApiResponse::Runs { token: 1, result } => {
                assert_eq!(result.unwrap_err().status(), Some(400));
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn download_writes_sanitized_file() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        dispatch(
            Command::Download {
                key: "svc-a/1.1/r1/index.html".into(),
            },
            mock(),
            tx,
            dir.path().to_path_buf(),
        );
        match rx.recv().await.unwrap() {
            ApiResponse::Downloaded { result } => {
                let path = result.unwrap();
                assert_eq!(
                    path.file_name().unwrap().to_str().unwrap(),
                    "svc-a_1.1_r1_index.html"
                );
                let written = std::fs::read_to_string(&path).unwrap();
                assert_eq!(written, "svc-a/1.1/r1/index.html");
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn download_file_name_never_escapes() {
        assert_eq!(download_file_name("a/b\\c.html"), "a_b_c.html");
        assert_eq!(download_file_name(""), "artifact");
    }

    #[tokio::test]
    async fn end_to_end_select_and_fetch_via_mock() {
        use crate::controller::{DashboardController, UiEvent};
        use url::Url;

        let api = mock();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let controller =
            DashboardController::new(Url::parse("http://localhost:8080").unwrap(), false);
        let mut app = TuiApp::new(controller, "http://localhost:8080".into());

        app.controller.handle(UiEvent::SelectApp {
            scope: Scope::Dashboard,
            app: Some("svc-a".into()),
        });
        pump_commands(&mut app, &api, &tx, Path::new("."));

        let response = rx.recv().await.unwrap();
        app.update(TuiMessage::Api(response));
        assert_eq!(app.controller.dashboard.releases, vec!["svc-a-1.0"]);
    }
}
