// Tenant Ledger - Fixture Server
// Serves the tenant and transaction endpoints from a JSON fixture

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tenant_ledger::config::LoggingConfig;
use tenant_ledger::fixture::{self, Fixture};
use tenant_ledger::logging;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ledger-server", version, about = "Serve the ledger API from a JSON fixture")]
struct Args {
    /// Fixture file with `tenants` and `transactions` arrays
    #[arg(long, default_value = "fixtures/ledger.json")]
    fixture: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8000")]
    bind: String,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_stderr(&LoggingConfig {
        level: args.log_level.clone(),
        file: None,
    });

    let fixture = Fixture::load(&args.fixture)?;

    let app = fixture::router(fixture)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", args.bind))?;

    info!("Server running on http://{}", listener.local_addr()?);
    info!("  API: http://{}/api/tenants/", listener.local_addr()?);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
