//! `coldtrace-worker` -- offline breach detection runner.
//!
//! Loads a cold-chain export (sensors, breach configurations,
//! temperature logs), replays breach detection for every sensor, and
//! logs what a live run would have recorded.
//!
//! # Environment variables
//!
//! | Variable      | Required | Default | Description                     |
//! |---------------|----------|---------|---------------------------------|
//! | `EXPORT_PATH` | yes      | --      | Path to the JSON export to scan |

use std::sync::Arc;

use anyhow::Context;

use coldtrace_detector::BreachMonitor;
use coldtrace_worker::export::ColdChainExport;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coldtrace_worker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let export_path =
        std::env::var("EXPORT_PATH").context("EXPORT_PATH environment variable is required")?;

    let raw = tokio::fs::read_to_string(&export_path)
        .await
        .with_context(|| format!("Failed to read export file {export_path}"))?;
    let export = ColdChainExport::from_json(&raw)
        .with_context(|| format!("Failed to parse export file {export_path}"))?;
    export
        .validate()
        .context("Export contains an invalid breach configuration")?;

    tracing::info!(
        sensors = export.sensors.len(),
        configs = export.configs.len(),
        logs = export.logs.len(),
        "Loaded cold-chain export",
    );

    let store = Arc::new(export.into_store().await);
    let monitor = BreachMonitor::new(store.clone());

    let mut breaches_total = 0;
    let mut links_total = 0;
    for sensor in store.sensors().await {
        let outcome = monitor
            .check_sensor(&sensor)
            .await
            .with_context(|| format!("Breach scan failed for sensor {}", sensor.id))?;
        tracing::info!(
            sensor_id = %outcome.sensor_id,
            breaches = outcome.breaches_recorded,
            linked = outcome.logs_linked,
            "Sensor scan complete",
        );
        breaches_total += outcome.breaches_recorded;
        links_total += outcome.logs_linked;
    }

    tracing::info!(
        breaches = breaches_total,
        linked = links_total,
        "Cold-chain scan finished",
    );
    Ok(())
}
