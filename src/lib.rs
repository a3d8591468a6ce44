pub mod config;
pub mod infra;
pub mod models;
pub mod services;

use std::net::Ipv4Addr;

use tokio::signal;

use config::{ConfigError, Settings};
use services::manager::{Connection, ConnectionManager, DatabaseError};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Configuration error | {0}")]
    Config(#[from] ConfigError),
    #[error("Database error | {0}")]
    Database(#[from] DatabaseError),
    #[error("Server error | {0}")]
    Io(#[from] std::io::Error),
}

/// Connects to MongoDB, serves until a shutdown signal and disconnects.
pub async fn start_app() -> Result<(), AppError> {
    let settings = Settings::from_env()?;
    let port = settings.port;

    let mut manager = ConnectionManager::new(settings);

    let connection = manager.connect().await?;

    if !connection.warnings().is_empty() {
        tracing::warn!(
            "Started with {} incomplete initialization steps",
            connection.warnings().len()
        );
    }

    let served = serve(connection, port).await;

    manager.disconnect().await?;

    Ok(served?)
}

async fn serve(connection: Connection, port: u16) -> std::io::Result<()> {
    let app = infra::router(connection);

    let address = (Ipv4Addr::UNSPECIFIED, port);

    let listener = tokio::net::TcpListener::bind(address).await?;

    tracing::info!("Listening on {:?}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C | {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM | {e}");
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

    tracing::info!("Shutting down");
}
