//! TrackVision
//!
//! Fetches lap telemetry, falls back to the local snapshot when the remote
//! store is unavailable, and prints the requested lap analytics.

use anyhow::Result;
use clap::Parser;
use std::io;
use tracing::info;
use trv_cli::cli::Args;
use trv_cli::commands;
use trv_cli::settings::Settings;
use trv_cli::sinks::{JsonLinesSink, Sink, TextSink};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?.with_overrides(&args);

    info!("Starting TrackVision against {}", settings.source.base_url);

    let outcome = commands::run(&args.command, &settings)?;

    let stdout = io::stdout();
    let mut sinks: Vec<Box<dyn Sink>> = vec![Box::new(TextSink::new(
        stdout.lock(),
        settings.display_utc_offset_hours,
    ))];
    if let Some(path) = &args.export {
        sinks.push(Box::new(JsonLinesSink::new(path)?));
    }

    for sink in sinks.iter_mut() {
        sink.render(&outcome)?;
    }

    Ok(())
}
