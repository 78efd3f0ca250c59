// ABOUTME: Server bootstrap for AutoHub
// ABOUTME: Opens the database, layers CORS and request tracing, and serves the API

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use autohub_api::{create_app, DbState, USER_ID_HEADER, USER_ROLE_HEADER};
use autohub_storage::StorageConfig;

pub mod config;
pub mod logging;

#[cfg(test)]
mod tests;

pub use config::{Config, ConfigError, LogFormat};
pub use logging::init_logging;

pub fn storage_config(config: &Config) -> StorageConfig {
    StorageConfig {
        max_connections: config.db_max_connections,
        ..StorageConfig::with_path(&config.database_path)
    }
}

/// API router with the CORS and tracing layers applied
pub fn build_app(db: DbState, config: &Config) -> Result<Router, ConfigError> {
    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|_| ConfigError::InvalidCorsOrigin(config.cors_origin.clone()))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_ROLE_HEADER),
        ]);

    Ok(create_app(db).layer(TraceLayer::new_for_http()).layer(cors))
}

/// Apply pending migrations and exit
pub async fn migrate(config: &Config) -> anyhow::Result<()> {
    let db = DbState::init(&storage_config(config)).await?;
    db.pool.close().await;

    info!("Migrations applied to {}", config.database_path.display());
    Ok(())
}

pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let db = DbState::init(&storage_config(&config)).await?;
    let app = build_app(db, &config)?;

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("AutoHub API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
