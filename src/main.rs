//! BloodLink API server
//!
//! Main application entry point

use std::time::Duration;
use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use bloodlink::{
    config::Settings,
    database::{self, DatabaseConfig},
    utils::logging,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", bloodlink::info());

    // Initialize database connection
    info!("Connecting to database...");
    let pool = database::create_pool(&DatabaseConfig::from(&settings.database)).await?;

    if settings.database.run_migrations {
        database::run_migrations(&pool).await?;
    }

    let address = settings.bind_address();
    let cleanup_every = Duration::from_secs(settings.rate_limit.window_seconds.max(1));
    let state = AppState::new(settings, pool);
    let limiter_cleanup = state.services.login_limiter.start_cleanup(cleanup_every);
    let app = bloodlink::router(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    info!("Server listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    limiter_cleanup.abort();
    info!("BloodLink has been shut down.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
