//! Credit Ledger Core - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! CREDIT_DATABASE_URL=postgres://... cargo run --bin credit-ledger-api
//! ```
//!
//! # Environment Variables
//!
//! * `CREDIT_HOST` - Server host (default: 0.0.0.0)
//! * `CREDIT_PORT` - Server port (default: 8080)
//! * `CREDIT_DATABASE_URL` - PostgreSQL connection string
//! * `CREDIT_MAX_CONNECTIONS` / `CREDIT_MIN_CONNECTIONS` - Pool sizes
//! * `CREDIT_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)
//! * `CREDIT_NUMBERING_SEPARATOR` - Separator in allocated numbers (default: /)
//! * `CREDIT_NUMBERING_PAD_WIDTH` - Zero-padded sequence width (default: 3)
//!
//! A `.env` file in the working directory is loaded first, if present.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use infra_db::{create_pool, run_migrations, PostgresLedger};
use interface_api::{config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid CREDIT_* configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting Credit Ledger API Server"
    );

    let pool = create_pool(config.database())
        .await
        .context("failed to connect to the database")?;
    run_migrations(&pool).await.context("failed to run migrations")?;

    let state = AppState::new(Arc::new(PostgresLedger::new(pool)), config.numbering());
    let app = create_router(state);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
