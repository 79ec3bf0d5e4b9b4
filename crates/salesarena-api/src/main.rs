//! SalesArena API server entry point.

use salesarena_api::config::{AppConfig, LogFormat};
use salesarena_api::error::AppError;
use salesarena_api::state::AppState;
use salesarena_core::clock::SystemClock;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;

    let filter = EnvFilter::try_new(&config.log_filter)
        .map_err(|e| AppError::Telemetry(e.to_string()))?;
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.log_format {
        LogFormat::Json => subscriber.json().try_init(),
        LogFormat::Pretty => subscriber.pretty().try_init(),
    };
    installed.map_err(|e| AppError::Telemetry(e.to_string()))?;

    tracing::info!("Starting SalesArena API server");

    let app = salesarena_api::app(AppState::in_memory(SystemClock::shared()));

    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
