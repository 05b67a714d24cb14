//! Event Management API
//!
//! Main application entry point

use std::net::SocketAddr;

use anyhow::Context;
use tracing::{info, warn};

use event_management::{
    config::Settings,
    database::DatabaseService,
    handlers::router,
    services::mailer_from_config,
    state::AppState,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal outside development
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("loading configuration")?;
    settings.validate().context("validating configuration")?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", event_management::info());

    info!("Connecting to database...");
    let database = DatabaseService::connect(&settings.database)
        .await
        .context("opening the database")?;

    let mailer = mailer_from_config(&settings.mail).context("configuring mail")?;
    let address = settings.bind_address();
    let state = AppState::new(settings, database, mailer);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {}", address))?;
    info!(address = %address, "Listening; API docs at /docs/");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Event management API has been shut down.");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(error = %e, "Failed to listen for shutdown signal"),
    }
}
