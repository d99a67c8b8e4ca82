//! Tabbed layout: Dashboard (selectors, upload form, runs table) and
//! Analytics (selectors, date filters, bar chart), with the report
//! viewer, delete confirmation, and toast as overlays.
//!
//! ```text
//! ┌─[ Dashboard ]──[ Analytics ]────────────────────┐
//! │ Apps      │  Runs                               │
//! │ Releases  │                                     │
//! │ Upload    │                                     │
//! ├─────────────────────────────────────────────────┤
//! │ reportdeck · http://… · key hints               │
//! └─────────────────────────────────────────────────┘
//! ```

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph,
    Row, Table, TableState, Wrap,
};
use ratatui::Frame;

use crate::controller::{ChartMode, ChartModel, ReportContent, SelectorState, ToastKind};

use super::app::{ActiveTab, AnalyticsFocus, DashFocus, TuiApp, UploadField};
use super::format::{format_duration_ms, short_timestamp};

/// Bar colors in series order, matching the web dashboard's palette
/// (green/red/orange/gray).
const SERIES_COLORS: [Color; 4] = [Color::Green, Color::Red, Color::Yellow, Color::DarkGray];

/// Draw the full TUI layout.
pub fn draw(f: &mut Frame, app: &mut TuiApp) {
    let full = f.area();
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tab bar
            Constraint::Min(10),   // content
            Constraint::Length(1), // status bar
        ])
        .split(full);

    draw_tab_bar(f, app, outer[0]);

    match app.active_tab {
        ActiveTab::Dashboard => draw_dashboard(f, app, outer[1]),
        ActiveTab::Analytics => draw_analytics(f, app, outer[1]),
    }

    draw_status(f, app, outer[2]);

    if app.controller.viewer.visible {
        draw_viewer(f, app, outer[1]);
    }
    if app.controller.pending_delete.is_some() {
        draw_confirm(f, app, full);
    }
    if app.controller.toast.is_some() {
        draw_toast(f, app, full);
    }
}

fn draw_tab_bar(f: &mut Frame, app: &TuiApp, area: Rect) {
    let tabs: [(&str, ActiveTab); 2] = [
        ("Dashboard", ActiveTab::Dashboard),
        ("Analytics", ActiveTab::Analytics),
    ];
    let mut spans: Vec<Span> = Vec::new();
    for (i, (name, tab)) in tabs.iter().enumerate() {
        let style = if *tab == app.active_tab {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} [{}] ", name, i + 1), style));
        spans.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Block border style: cyan when the pane has focus.
fn pane_block(title: String, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

fn selector_title(name: &str, selected: Option<&str>) -> String {
    match selected {
        Some(value) => format!(" {name} \u{2022} {value} "),
        None => format!(" {name} "),
    }
}

fn draw_pick_list(
    f: &mut Frame,
    area: Rect,
    title: String,
    items: &[String],
    cursor: usize,
    selected: Option<&str>,
    focused: bool,
    enabled: bool,
) {
    let list_items: Vec<ListItem> = items
        .iter()
        .map(|item| {
            let marker = if Some(item.as_str()) == selected {
                "\u{2713} "
            } else {
                "  "
            };
            let style = if enabled {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::new(Line::styled(format!("{marker}{item}"), style))
        })
        .collect();

    let list = List::new(list_items)
        .block(pane_block(title, focused))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !items.is_empty() && enabled {
        state.select(Some(cursor.min(items.len() - 1)));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_dashboard(f: &mut Frame, app: &mut TuiApp, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(40)])
        .split(area);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(4),
            Constraint::Min(4),
            Constraint::Length(8),
        ])
        .split(columns[0]);

    let selector = &app.controller.dashboard;
    draw_pick_list(
        f,
        sidebar[0],
        selector_title("Apps", selector.selected_app.as_deref()),
        &selector.apps,
        app.apps_cursor,
        selector.selected_app.as_deref(),
        app.dash_focus == DashFocus::Apps,
        true,
    );
    draw_pick_list(
        f,
        sidebar[1],
        selector_title("Releases", selector.selected_release.as_deref()),
        &selector.releases,
        app.releases_cursor,
        selector.selected_release.as_deref(),
        app.dash_focus == DashFocus::Releases,
        true,
    );
    draw_upload_form(f, app, sidebar[2]);
    draw_runs_table(f, app, columns[1]);
}

fn draw_upload_form(f: &mut Frame, app: &TuiApp, area: Rect) {
    let form = &app.controller.upload;
    let focused = app.dash_focus == DashFocus::Upload;
    let title = if form.in_flight {
        " Upload (uploading\u{2026}) ".to_string()
    } else {
        " Upload ".to_string()
    };

    let fields: [(&str, &str, UploadField); 4] = [
        ("App", &form.app_id, UploadField::AppId),
        ("Release", &form.release, UploadField::Release),
        ("Date", &form.execution_date, UploadField::Date),
        ("File", &form.file, UploadField::File),
    ];
    let mut lines: Vec<Line> = fields
        .iter()
        .map(|(label, value, field)| {
            let active = focused && app.upload_field == *field;
            let style = if active {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let cursor = if active { "\u{258f}" } else { "" };
            Line::styled(format!("{label:>7}: {value}{cursor}"), style)
        })
        .collect();
    lines.push(Line::styled(
        "  Enter: upload",
        Style::default().fg(Color::DarkGray),
    ));

    f.render_widget(Paragraph::new(lines).block(pane_block(title, focused)), area);
}

fn draw_runs_table(f: &mut Frame, app: &TuiApp, area: Rect) {
    let selector = &app.controller.dashboard;
    let context = match (&selector.selected_app, &selector.selected_release) {
        (Some(a), Some(r)) => format!(" Runs \u{2022} {a}/{r} ({}) ", app.controller.runs.len()),
        (Some(a), None) => format!(" Runs \u{2022} {a} "),
        _ => " Runs ".to_string(),
    };
    let focused = app.dash_focus == DashFocus::Runs;

    let header = Row::new(
        ["Run", "Time", "Pass", "Fail", "Brk", "Skip", "Total", "Dur"]
            .into_iter()
            .map(Cell::from),
    )
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .controller
        .runs
        .iter()
        .map(|run| {
            Row::new(vec![
                Cell::from(run.run_id.clone()),
                Cell::from(short_timestamp(&run.timestamp)),
                Cell::from(run.passed.to_string())
                    .style(Style::default().fg(Color::Green)),
                Cell::from(run.failed.to_string()).style(Style::default().fg(Color::Red)),
                Cell::from(run.broken.to_string())
                    .style(Style::default().fg(Color::Yellow)),
                Cell::from(run.skipped.to_string())
                    .style(Style::default().fg(Color::DarkGray)),
                Cell::from(run.total.to_string()),
                Cell::from(format_duration_ms(run.duration_ms)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(10),
            Constraint::Length(16),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Length(6),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(pane_block(context, focused))
    .row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = TableState::default();
    if !app.controller.runs.is_empty() {
        state.select(Some(app.runs_cursor.min(app.controller.runs.len() - 1)));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_analytics(f: &mut Frame, app: &mut TuiApp, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(40)])
        .split(area);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(4),
            Constraint::Min(4),
            Constraint::Length(7),
        ])
        .split(columns[0]);

    let release_enabled = app.controller.release_enabled;
    let selector: &SelectorState = &app.controller.analytics;
    draw_pick_list(
        f,
        sidebar[0],
        selector_title("Apps", selector.selected_app.as_deref()),
        &selector.apps,
        app.an_apps_cursor,
        selector.selected_app.as_deref(),
        app.analytics_focus == AnalyticsFocus::Apps,
        true,
    );
    let release_title = if release_enabled {
        selector_title("Releases", selector.selected_release.as_deref())
    } else {
        " Releases (disabled) ".to_string()
    };
    draw_pick_list(
        f,
        sidebar[1],
        release_title,
        &selector.releases,
        app.an_releases_cursor,
        selector.selected_release.as_deref(),
        app.analytics_focus == AnalyticsFocus::Releases && release_enabled,
        release_enabled,
    );
    draw_filters(f, app, sidebar[2]);
    draw_chart_area(f, app, columns[1]);
}

fn draw_filters(f: &mut Frame, app: &TuiApp, area: Rect) {
    let mode = match app.controller.chart_mode {
        ChartMode::AppOverview => "App overview",
        ChartMode::ReleaseTrend => "Release trend",
    };
    let date_line = |label: &str, value: &str, focus: AnalyticsFocus| {
        let active = app.analytics_focus == focus;
        let style = if active {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let cursor = if active { "\u{258f}" } else { "" };
        Line::styled(format!("{label:>5}: {value}{cursor}"), style)
    };

    let lines = vec![
        Line::from(format!(" Mode: {mode} (m)")),
        date_line(" From", &app.controller.from_date, AnalyticsFocus::FromDate),
        date_line("   To", &app.controller.to_date, AnalyticsFocus::ToDate),
        Line::styled("  g: load chart", Style::default().fg(Color::DarkGray)),
    ];

    let focused = matches!(
        app.analytics_focus,
        AnalyticsFocus::FromDate | AnalyticsFocus::ToDate
    );
    f.render_widget(
        Paragraph::new(lines).block(pane_block(" Filters ".into(), focused)),
        area,
    );
}

fn draw_chart_area(f: &mut Frame, app: &TuiApp, area: Rect) {
    match &app.controller.chart {
        Some(model) => draw_chart(f, model, area),
        None => {
            let text = if app.controller.chart_loading {
                "Loading chart\u{2026}"
            } else {
                "No chart loaded. Pick an app and dates, then press g."
            };
            f.render_widget(
                Paragraph::new(text)
                    .style(Style::default().fg(Color::DarkGray))
                    .block(pane_block(" Chart ".into(), false)),
                area,
            );
        }
    }
}

fn draw_chart(f: &mut Frame, model: &ChartModel, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);

    let title = match model.mode {
        ChartMode::AppOverview => " Chart \u{2022} pass % by release ",
        ChartMode::ReleaseTrend => " Chart \u{2022} results over time ",
    };

    let mut chart = BarChart::default()
        .block(pane_block(title.into(), false))
        .bar_width(6)
        .bar_gap(1)
        .group_gap(2);
    for group in &model.groups {
        let bars: Vec<Bar> = group
            .values
            .iter()
            .zip(SERIES_COLORS)
            .map(|(value, color)| {
                Bar::default()
                    .value(*value)
                    .style(Style::default().fg(color))
            })
            .collect();
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(group.label.clone()))
                .bars(&bars),
        );
    }
    f.render_widget(chart, rows[0]);

    let mut legend: Vec<Span> = Vec::new();
    for (label, color) in model.series_labels().into_iter().zip(SERIES_COLORS) {
        legend.push(Span::styled("\u{25a0} ", Style::default().fg(color)));
        legend.push(Span::raw(format!("{label}  ")));
    }
    f.render_widget(Paragraph::new(Line::from(legend)), rows[1]);
}

fn draw_viewer(f: &mut Frame, app: &TuiApp, area: Rect) {
    let overlay = centered_rect(area, 94, 92);
    f.render_widget(Clear, overlay);

    let viewer = &app.controller.viewer;
    let title = match &viewer.key {
        Some(key) => format!(" Report \u{2022} {key} "),
        None => " Report ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(overlay);
    f.render_widget(block, overlay);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    let body = match &viewer.content {
        Some(ReportContent::Loaded(markup)) => Paragraph::new(markup.as_str()),
        Some(ReportContent::Failed(message)) => {
            Paragraph::new(message.as_str()).style(Style::default().fg(Color::Red))
        }
        Some(ReportContent::Loading) | None => {
            Paragraph::new("Loading\u{2026}").style(Style::default().fg(Color::DarkGray))
        }
    };
    f.render_widget(
        body.wrap(Wrap { trim: false }).scroll((app.viewer_scroll, 0)),
        rows[0],
    );

    let download = viewer.download_url.as_deref().unwrap_or("-");
    f.render_widget(
        Paragraph::new(format!(
            " Esc close \u{2022} \u{2191}/\u{2193} scroll \u{2022} s save \u{2022} {download}"
        ))
        .style(Style::default().fg(Color::DarkGray)),
        rows[1],
    );
}

fn draw_confirm(f: &mut Frame, app: &TuiApp, area: Rect) {
    let Some(target) = &app.controller.pending_delete else {
        return;
    };
    let text = target.describe();
    let width = (text.len() as u16 + 6).clamp(30, area.width.saturating_sub(4));
    let popup = centered_fixed(area, width, 5);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(" Confirm delete ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let lines = vec![
        Line::from(text),
        Line::from(""),
        Line::styled("y: delete    n: cancel", Style::default().fg(Color::DarkGray)),
    ];
    f.render_widget(Paragraph::new(lines).block(block), popup);
}

fn draw_toast(f: &mut Frame, app: &TuiApp, area: Rect) {
    let Some(toast) = &app.controller.toast else {
        return;
    };
    let style = match toast.kind {
        ToastKind::Success => Style::default().fg(Color::Black).bg(Color::Green),
        ToastKind::Error => Style::default().fg(Color::White).bg(Color::Red),
    };
    let width = (toast.text.len() as u16 + 4).clamp(12, area.width.saturating_sub(2));
    let rect = Rect {
        x: area.width.saturating_sub(width + 1),
        y: area.height.saturating_sub(4),
        width,
        height: 3,
    };
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(toast.text.as_str())
            .style(style)
            .block(Block::default().borders(Borders::ALL).border_style(style)),
        rect,
    );
}

fn draw_status(f: &mut Frame, app: &TuiApp, area: Rect) {
    let hints = match app.active_tab {
        ActiveTab::Dashboard => {
            "Tab focus \u{2022} Enter select \u{2022} l runs \u{2022} v view \u{2022} s save \u{2022} d/D delete \u{2022} q quit"
        }
        ActiveTab::Analytics => {
            "Tab focus \u{2022} Enter select \u{2022} m mode \u{2022} g chart \u{2022} q quit"
        }
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" reportdeck \u{2022} {} ", app.server),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

/// A rect centered in `area`, sized as a percentage of it.
fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    centered_fixed(area, width, height)
}

/// A fixed-size rect centered in `area`.
fn centered_fixed(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Run;
    use crate::controller::{DashboardController, UiEvent};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use url::Url;

    fn app() -> TuiApp {
        let controller = DashboardController::new(
            Url::parse("http://localhost:8080").unwrap(),
            false,
        );
        TuiApp::new(controller, "http://localhost:8080".into())
    }

    fn render_to_text(app: &mut TuiApp) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.cell((x, y)).unwrap().symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn renders_dashboard_tab() {
        let mut app = app();
        app.controller.dashboard.apps = vec!["svc-a".into()];
        let text = render_to_text(&mut app);
        assert!(text.contains("Apps"));
        assert!(text.contains("svc-a"));
        assert!(text.contains("Upload"));
        assert!(text.contains("Runs"));
    }

    #[test]
    fn renders_run_row() {
        let mut app = app();
        app.controller.runs = vec![Run {
            run_id: "r1".into(),
            timestamp: "2024-05-01T12:34:56".into(),
            passed: 10,
            failed: 2,
            broken: 0,
            skipped: 1,
            total: 13,
            duration_ms: 500,
            html_path: "svc-a/1.1/r1/index.html".into(),
        }];
        let text = render_to_text(&mut app);
        assert!(text.contains("r1"));
        assert!(text.contains("2024-05-01 12:34"));
        assert!(text.contains("500ms"));
    }

    #[test]
    fn renders_analytics_with_disabled_releases() {
        let mut app = app();
        app.active_tab = ActiveTab::Analytics;
        let text = render_to_text(&mut app);
        assert!(text.contains("Releases (disabled)"));
        assert!(text.contains("Mode: App overview"));
    }

    #[test]
    fn renders_chart_and_legend() {
        let mut app = app();
        app.active_tab = ActiveTab::Analytics;
        app.controller.chart = Some(ChartModel::overview(&[crate::api::OverviewPoint {
            release: "1.0".into(),
            pass_percent: 92.4,
            failed: Some(3),
            broken: Some(1),
            skipped: Some(0),
        }]));
        let text = render_to_text(&mut app);
        assert!(text.contains("1.0"));
        assert!(text.contains("Pass %"));
        assert!(text.contains("Skipped"));
    }

    #[test]
    fn renders_viewer_overlay_with_download_hint() {
        let mut app = app();
        app.controller.handle(UiEvent::OpenReport {
            key: "svc-a/1.1/r1/index.html".into(),
        });
        app.controller.take_commands();
        let text = render_to_text(&mut app);
        assert!(text.contains("Report"));
        assert!(text.contains("/api/download?key="));
    }

    #[test]
    fn renders_confirm_modal() {
        let mut app = app();
        app.controller.handle(UiEvent::RequestDeleteRun {
            run_id: "r1".into(),
        });
        let text = render_to_text(&mut app);
        assert!(text.contains("Confirm delete"));
        assert!(text.contains("Delete run r1?"));
    }

    #[test]
    fn renders_toast() {
        let mut app = app();
        app.controller.handle(UiEvent::LoadRuns); // validation toast
        let text = render_to_text(&mut app);
        assert!(text.contains("Select app and release"));
    }
}
