use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use college_api::{config, database, AppState};

/// College records HTTP API.
#[derive(Debug, Parser)]
#[command(name = "college-api", version, about)]
struct Args {
    /// Interface to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides COLLEGE_API_PORT / PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Skip creating tables and seeding departments at startup
    #[arg(long)]
    skip_bootstrap: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL and AUTH_* passwords are picked up
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let config = config::config();

    let default_filter = if config.api.enable_request_logging {
        "college_api=debug,tower_http=info"
    } else {
        "college_api=debug,tower_http=warn"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting College Records API in {:?} mode", config.environment);

    let state = AppState::from_config(config).context("invalid database configuration")?;
    info!(database = %state.db.description(), "Database target configured");

    if config.database.bootstrap_on_start && !args.skip_bootstrap {
        if let Err(e) = database::bootstrap(&state.db).await {
            error!(error = %e, "Schema bootstrap failed; continuing without it");
        }
    }

    let app = college_api::app(state, config);

    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("College Records API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
