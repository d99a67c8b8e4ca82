use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use reportdeck::api::PlatformClient;
use reportdeck::config::Config;
use reportdeck::controller::DashboardController;
use reportdeck::tui::runner::run_tui;

#[derive(Parser)]
#[command(name = "reportdeck", about = "Terminal dashboard for a test-report platform.")]
struct Cli {
    /// Server base URL (overrides config file and REPORTDECK_SERVER)
    #[arg(short, long)]
    server: Option<String>,

    /// Allow loading runs with only an app selected
    #[arg(long)]
    release_optional: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("reportdeck=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load();
    let base = config.resolve_server(cli.server.as_deref())?;
    let release_optional = cli.release_optional || config.release_optional;

    info!("reportdeck connecting to {base}");

    let api = Arc::new(PlatformClient::new(base.clone()));
    let controller = DashboardController::new(base.clone(), release_optional);
    run_tui(api, controller, base.to_string(), config.download_dir()).await
}
