//! Bird Feeding Tracker - Binary Entry Point
//!
//! Opens the record store, builds the analysis dispatcher and serves the HTTP API.

use std::sync::Arc;

use bird_feeding::api::{create_router, AppState};
use bird_feeding::{FeedingService, ServerArgs, ServiceConfig};
use clap::Parser;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ServerArgs::parse();
    init_logging(args.log_json, args.log_filter.as_deref());

    let config = ServiceConfig::from(args);
    let addr = config.bind_addr()?;

    let service = Arc::new(FeedingService::open(&config)?);
    match &config.engine.command {
        Some(command) => info!(
            engine = %command.display(),
            timeout_ms = config.engine.timeout.as_millis() as u64,
            "External analysis engine configured"
        ),
        None => info!("No external analysis engine configured, using local analyzer"),
    }

    let app = create_router(Arc::new(AppState::new(service)));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Bird feeding API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Bird feeding API stopped");
    Ok(())
}

fn init_logging(json: bool, filter: Option<&str>) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(filter.unwrap_or("bird_feeding=info,tower_http=info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
