//! `bodymap-viewer` -- body-region heatmap driver.
//!
//! Loads exported symptom logs, writes the pain-type legend, the labeled
//! region list and a heatmap frame to stdout as JSON lines, then applies
//! commands read from stdin (see [`bodymap_viewer::command`]) and writes a
//! new frame after each change.
//!
//! # Environment variables
//!
//! | Variable                | Required | Default     | Description                          |
//! |-------------------------|----------|-------------|--------------------------------------|
//! | `BODYMAP_LOGS_PATH`     | no       | `logs.json` | JSON array of log rows               |
//! | `BODYMAP_REFERENCE_DAY` | no       | today       | `YYYY-MM-DD`, `today` or `now`       |
//! | `BODYMAP_REFRESH_SECS`  | no       | `0`         | Seconds between log re-reads, 0 = off|
//! | `BODYMAP_PRETTY`        | no       | `false`     | Pretty-print JSON output             |

use std::sync::Arc;

use bodymap_core::selection::SelectionState;
use bodymap_viewer::config::ViewerConfig;
use bodymap_viewer::session::{self, HeatmapSession};
use bodymap_viewer::source::JsonFileLogSource;
use bodymap_viewer::surface::JsonLinesSurface;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // stdout carries the frame stream, so logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bodymap_viewer=info,bodymap_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ViewerConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
    })?;

    let source = JsonFileLogSource::new(config.logs_path.clone());
    tracing::info!(
        logs_path = %source.path().display(),
        reference_day = ?config.reference_day,
        refresh_secs = config.refresh_secs,
        "Starting bodymap-viewer",
    );

    let selection = Arc::new(SelectionState::new());
    let mut session = HeatmapSession::new(source, selection);
    session.set_reference_day(config.reference_day);
    session.refresh();

    let mut surface = JsonLinesSurface::stdout(config.pretty);
    surface.emit_legend();
    surface.emit_regions();
    session.push_frame(&mut surface);

    session::run(&mut session, &mut surface, config.refresh_interval()).await;
    Ok(())
}
