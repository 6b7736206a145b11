//! weathercache - a caching weather station daemon.
//!
//! Polls OpenWeatherMap every few minutes, keeps the latest readings in memory
//! (restored from disk on startup) and serves them on `/weatherStation`.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use futures::FutureExt;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use weathercache_core::scheduler::Job;
use weathercache_core::{http, Config, Scheduler, TracingNotifier, WeatherStation};

#[derive(Debug, Parser)]
#[command(name = "weathercache", version, about)]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, env = "WEATHERCACHE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to serve the HTTP API on
    #[arg(short, long)]
    listen: Option<String>,

    /// Poll interval in seconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Directory for the persisted weather values
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env()?;

    if let Some(ref listen) = cli.listen {
        config.listen_addr = listen.clone();
    }
    if let Some(interval) = cli.interval {
        config.poll_interval_secs = interval;
    }
    if let Some(ref dir) = cli.data_dir {
        config.data_dir = Some(dir.clone());
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing();

    let config = load_config(&cli)?;
    info!(
        lat = config.provider.latitude,
        lon = config.provider.longitude,
        interval_secs = config.poll_interval_secs,
        "weathercache starting"
    );

    let station = Arc::new(WeatherStation::from_config(&config, Arc::new(TracingNotifier))?);

    // A bad persisted file must not keep the service from starting.
    match station.restore().await {
        Ok(freshness) => info!(?freshness, "Startup state loaded"),
        Err(e) => {
            let detail = format!("{:#}", e);
            error!(error = %detail, "Ignoring persisted weather values");
        }
    }

    let job_station = station.clone();
    let job: Job = Arc::new(move || {
        let station = job_station.clone();
        async move { station.update().await }.boxed()
    });
    let scheduler = Scheduler::new(config.poll_interval()).spawn(job);

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "Serving weather station API");

    axum::serve(listener, http::router(station))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    scheduler.abort();
    info!("weathercache shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
