//! Treemap HTTP Server Binary
//!
//! This is the main entry point for the treemap REST API server.
//! It loads the field configuration, starts the record poller, and serves
//! the engine over HTTP.
//!
//! # Usage
//!
//! ```bash
//! CONFIG_PATH=config.json DATA_PATH=data.json cargo run --bin treemap-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `CONFIG_URL` / `CONFIG_PATH`: Field configuration source (default: config.json)
//! - `DATA_URL` / `DATA_PATH`: Record document source (default: data.json)
//! - `POLL_INTERVAL_MS`: Record polling cadence (default: 1000)
//! - `COLOR_CYCLE_MS`: Color-cycle interval; 0 or unset disables cycling
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use treemap_rust::http::{create_router, AppState};
use treemap_rust::services::dataset::{
    fetch_config, fetch_records, spawn_poller, DataStore, Source, DEFAULT_POLL_INTERVAL,
};
use treemap_rust::services::view::CycleTimer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .init();

    info!("Starting treemap HTTP server");

    let config_source = source_from_env("CONFIG_URL", "CONFIG_PATH", "config.json");
    let data_source = source_from_env("DATA_URL", "DATA_PATH", "data.json");

    // The schema is fetched once and immutable for the session.
    let schema = fetch_config(&config_source)
        .await
        .with_context(|| format!("Failed to load field configuration from {}", config_source))?;
    info!(fields = schema.len(), %config_source, "Field configuration loaded");

    // Initial record load. A failure here is tolerated: the poller keeps
    // retrying and the store reports the error until a fetch succeeds.
    let store = Arc::new(DataStore::new());
    match fetch_records(&data_source).await {
        Ok((records, checksum)) => {
            let count = records.len();
            store.apply_fetch(records, checksum);
            info!(count, %data_source, "Initial record set loaded");
        }
        Err(error) => {
            store.record_failure(&error);
            warn!(%error, %data_source, "Initial record fetch failed, starting empty");
        }
    }

    let poll_interval = env::var("POLL_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_POLL_INTERVAL);
    let _poller = spawn_poller(data_source, Arc::clone(&store), poll_interval);
    info!(interval_ms = poll_interval.as_millis() as u64, "Record poller started");

    // Create application state
    let state = AppState::new(Arc::new(schema), store);

    // Optional color cycling; the timer lives for the whole process.
    let cycle_interval: u64 = env::var("COLOR_CYCLE_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let _cycle_timer = if cycle_interval > 0 && !state.cycle.is_empty() {
        info!(interval_ms = cycle_interval, "Color cycling enabled");
        Some(CycleTimer::start(
            Arc::clone(&state.cycle),
            Duration::from_millis(cycle_interval),
        ))
    } else {
        None
    };

    // Create router with all endpoints
    let app = create_router(state);

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn source_from_env(url_var: &str, path_var: &str, default_path: &str) -> Source {
    Source::from_options(env::var(url_var).ok(), env::var(path_var).ok())
        .unwrap_or_else(|| Source::File(default_path.into()))
}
