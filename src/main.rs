//! Dashboard entry point.
//!
//! Initializes tracing, loads configuration, builds the Axum router with the
//! PostgreSQL connector and starts the HTTP server.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gws_dashboard::config::{AppConfig, DEFAULT_LOG_FILTER};
use gws_dashboard::db::PgConnector;
use gws_dashboard::http::start_server;
use gws_dashboard::templates::init_templates;
use gws_dashboard::{create_router, AppState};

/// Status dashboard for the Global Warning System database
#[derive(Parser, Debug)]
#[command(name = "gws-dashboard", version, about)]
struct Args {
    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Log level filter (e.g., "gws_dashboard=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Configuration first so the log format is known before the subscriber is installed
    let config = AppConfig::load(args.config.as_deref())?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        config_file = args.config.as_deref().unwrap_or("(defaults)"),
        "Loaded configuration"
    );
    tracing::info!(
        secret_dir = %config.database.secret_dir.display(),
        database = %config.database.name,
        timeout_secs = config.database.connect_timeout_seconds,
        "Database probe configured"
    );

    let tera = init_templates()?;
    tracing::info!("Initialized templates");

    let state = AppState::new(config.clone(), tera, Arc::new(PgConnector::new()));
    let app = create_router(state);

    start_server(app, &config.http).await?;

    Ok(())
}
