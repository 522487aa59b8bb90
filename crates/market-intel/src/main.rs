mod bootstrap;
mod report;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use market_core::settings::Settings;
use market_core::time_utils::resolve_timezone;
use market_data::reader::load_dataset;
use market_data::MarketAnalyzer;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::setup_logging(settings.effective_log_level(), settings.log_file.as_ref())?;

    tracing::info!("Market Intel v{} starting", env!("CARGO_PKG_VERSION"));

    let timezone = resolve_timezone(&settings.timezone)?;
    let data_path = settings
        .data_path
        .clone()
        .or_else(bootstrap::discover_data_path)
        .context("no --data-path given and neither ./data nor ~/.job-market/data exists")?;

    tracing::info!("Loading snapshot from {}", data_path.display());
    let dataset = load_dataset(&data_path)
        .with_context(|| format!("loading snapshot from {}", data_path.display()))?;

    let request = settings.dashboard_request();
    tracing::info!(
        "Location: {}, group by: {:?}, window: {} days, timezone: {}",
        request.location,
        request.group_by,
        request.days,
        timezone.name()
    );

    let span = tracing::info_span!("dashboard", location = %request.location);
    let analyzer = MarketAnalyzer::new()
        .with_timezone(timezone)
        .with_dispatch(tracing::dispatcher::get_default(tracing::Dispatch::clone))
        .with_span(span);

    let report =
        report::build_report_concurrently(Arc::new(analyzer), Arc::new(dataset), request).await?;

    let json = if settings.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");

    Ok(())
}
