mod api;
mod bootstrap;
mod completion;
mod config;
mod error;
mod ledger;
mod server;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AgentConfig;

// Initialize logging and tracing
fn init_tracing() {
    let filter = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| "info,tower_http=debug,server=debug".into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    if let Err(e) = run().await {
        error!("💥 Fatal: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("🚀 Starting translation requester agent");

    let config = AgentConfig::from_env().context("failed to load configuration")?;

    let state = bootstrap::initialize_app_state(&config);

    // Timer runs from startup; the runtime flag decides whether ticks do work
    let watcher = state.watcher.clone();
    watcher.start();

    let app = server::create_app(state).await;
    let served = server::run_server(app, &config.bind_address()).await;

    watcher.stop();
    info!("👋 Agent stopped");
    served
}
