use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use catassist::config::AppConfig;
use catassist::logging::init_logging;
use catassist::server::create_router;
use catassist::types::AppState;

/// Student advising API server.
#[derive(Debug, Parser)]
#[command(name = "catassist", version, about)]
struct Cli {
    /// Path to a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides the config file
    #[arg(long)]
    bind: Option<String>,

    /// SQLite database path, overrides the config file
    #[arg(long)]
    database: Option<PathBuf>,

    /// Replace all data with the demo fixture before serving
    #[arg(long)]
    seed: bool,

    /// Load the demo fixture and exit
    #[arg(long, conflicts_with = "seed")]
    seed_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(bind) = cli.bind {
        config.bind_address = bind;
    }
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    config.validate().context("Invalid configuration")?;

    init_logging(config.log_format).context("Failed to initialize logging")?;

    let state = AppState::open(config).context("Failed to initialize app state")?;

    if cli.seed || cli.seed_only {
        state.db.seed_demo_data().context("Failed to seed demo data")?;
    } else if state.config.seed_if_empty && !state.db.has_students()? {
        info!("Database has no students, loading demo data");
        state.db.seed_demo_data().context("Failed to seed demo data")?;
    }

    if cli.seed_only {
        return Ok(());
    }

    if !state.assistant.is_configured() {
        warn!("OPENAI_API_KEY is not set; POST /chat will answer 503");
    }

    let bind_address = state.config.bind_address.clone();
    let app = create_router(Arc::new(state));

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Server started on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
