//! sse-relay: streams text to HTTP clients as Server-Sent Events.
//!
//! Exposes three streaming endpoints behind one listener: plain
//! character-by-character streaming, the same stream bracketed by
//! open/done marker frames, and an NDJSON-to-SSE relay that forwards
//! prompts to a local text-generation backend.

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use sse_relay::config::{Cli, Config};
use sse_relay::server::routes::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    // Initialize tracing/logging.
    let filter = if cli.verbose {
        "sse_relay=debug,tower_http=debug"
    } else {
        "sse_relay=info,tower_http=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true)
        .init();

    info!("sse-relay v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration.
    let config = Config::load(&cli.config)?;
    let config = Arc::new(config);

    info!(
        backend = %config.backend.base_url,
        retry_ms = config.stream.retry_ms,
        "Configuration loaded"
    );

    // Build application state. One HTTP client is shared by all relay
    // requests; reqwest pools connections internally.
    let state = Arc::new(AppState {
        config: config.clone(),
        client: reqwest::Client::new(),
        start_time: Instant::now(),
    });

    // Build the HTTP router.
    let app = build_router(state);

    // Start the server.
    let listen_addr = cli
        .listen
        .unwrap_or_else(|| config.server.listen.clone());
    info!(addr = %listen_addr, "Starting server");

    let listener = TcpListener::bind(&listen_addr).await?;
    info!("Listening on {listen_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
