// Window evaluation CLI
//
// Purpose: Evaluate one trip window from a request file and print the result JSON
// Usage: cargo run --features cli --bin evaluate_window -- request.json [open_meteo.json ...]
//
// Each extra argument is an already-fetched Open-Meteo payload, added as a
// source named after the file stem.

use anyhow::Context;
use std::path::Path;
use trip_window_rust::{EvaluationRequest, EvaluatorConfig, OpenMeteoResponse, WindowPlanner};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "trip_window_rust=info,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let request_path = args
        .next()
        .context("usage: evaluate_window <request.json> [open_meteo.json ...]")?;

    // Configuration from environment variables
    let config = EvaluatorConfig::from_env()?;
    tracing::info!("Configuration:");
    tracing::info!("  extension_pad_hours: {}", config.extension_pad_hours);
    tracing::info!("  significant_digits: {}", config.significant_digits);

    let mut request = EvaluationRequest::load(Path::new(&request_path))?;

    for payload_path in args {
        let path = Path::new(&payload_path);
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("Invalid payload file name: {:?}", path))?
            .to_string();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read Open-Meteo payload: {:?}", path))?;
        let series = OpenMeteoResponse::from_json(&contents)?.to_series()?;
        tracing::info!("Loaded source '{}' ({} hours)", name, series.len());
        request.sources.insert(name, series);
    }

    let planner = WindowPlanner::new(config);
    let result = planner.evaluate(&request)?;
    tracing::info!("{}", result.message);
    if let Some(report) = &result.report {
        for condition in &report.conditions {
            let agreement = condition.flip_level.map_or("n/a", |l| l.display_text());
            tracing::info!(
                "  {}: {} (disagreement: {})",
                condition.label,
                if condition.ok { "ok" } else { "unideal" },
                agreement
            );
        }
        for (factor, climate) in &report.climatology {
            tracing::info!("  {} vs normal: {}", factor.display_text(), climate.fit.display_text());
        }
        for alt in &report.alt_windows {
            tracing::info!(
                "  {} option: {} to {}",
                alt.direction.display_text(),
                alt.start.format("%Y-%m-%d %H:%M"),
                alt.end_exclusive().format("%H:%M")
            );
        }
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
