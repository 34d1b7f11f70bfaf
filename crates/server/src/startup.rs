use std::net::SocketAddr;

use axum::Router;
use dotenvy::dotenv;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use configs::AppConfig;
use service::auth::AuthConfig;

use crate::routes::{self, auth::ServerState};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
    #[error("migration failed: {0}")]
    Migration(String),
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Connect, migrate and seed the first superuser, returning ready state.
pub async fn prepare_state(cfg: &AppConfig) -> anyhow::Result<ServerState> {
    let db: DatabaseConnection = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Migration(e.to_string()))?;

    let state = ServerState::new(db, AuthConfig::new(cfg.auth.jwt_secret.clone(), cfg.auth.access_token_ttl_minutes));

    match (&cfg.auth.first_superuser_email, &cfg.auth.first_superuser_password) {
        (Some(email), Some(password)) => {
            let su = state.auth.ensure_superuser(email, password).await?;
            info!(user_id = %su.id, email = %su.email, "first superuser ready");
        }
        _ => warn!("no first superuser configured"),
    }
    Ok(state)
}

/// Build the app from `cfg`, bind and serve until Ctrl+C.
pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    let state = prepare_state(&cfg).await?;
    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting server crate");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

/// Public entry: load configuration and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    run_with_config(cfg).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(err = %e, "cannot listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
}
