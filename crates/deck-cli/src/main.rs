//! `agentdeck` binary

use anyhow::Result;
use deck_cli::{command, commands, telemetry};
use deck_core::{Dashboard, HttpBackend, ReportCache};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = command().get_matches();

    telemetry::init(matches.get_flag("log-json"), matches.get_count("verbose"))?;

    let config = commands::config(&matches)?;
    tracing::debug!(api = %config.api_base_url, "configuration loaded");

    let backend = Arc::new(HttpBackend::new(&config)?);
    let dashboard = Dashboard::new(backend, ReportCache::new(config.report_cache_capacity));

    let mut stdout = std::io::stdout().lock();
    commands::dispatch(&matches, &dashboard, &config, &mut stdout).await
}
