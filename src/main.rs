//! Eventum service
//!
//! Main application entry point

use std::net::SocketAddr;

use tracing::info;

use eventum::{
    config::Settings,
    database::{self, connection::DatabaseConfig, DatabaseService},
    handlers::{self, AppState},
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting eventum service...");

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = DatabaseConfig {
        url: settings.database.url.clone(),
        max_connections: settings.database.max_connections,
        min_connections: settings.database.min_connections,
        ..DatabaseConfig::default()
    };
    let db_pool = database::create_pool(&db_config).await?;

    // Run database migrations
    database::run_migrations(&db_pool).await?;

    // Initialize services
    info!("Initializing services...");
    let database_service = DatabaseService::new(db_pool.clone());
    let services = ServiceFactory::new(database_service, settings.clone())?;

    // Build the router
    let state = AppState::new(services);
    let router = handlers::router(state);

    let addr = SocketAddr::new(settings.server.host.parse()?, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Eventum listening on {}", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Closing database connections...");
    db_pool.close().await;
    info!("Eventum has been shut down.");

    Ok(())
}

/// Resolve when the process receives a termination signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
