use std::net::{SocketAddr, ToSocketAddrs};

use axum::{extract::Request, Router, ServiceExt};
use configs::AppConfig;
use dotenvy::dotenv;
use tower_http::{cors::CorsLayer, normalize_path::NormalizePath};
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;
use service::{runtime, storage};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Host/port from the validated configuration; host names are resolved once here
fn load_bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let (host, port) = (cfg.server.host.as_str(), cfg.server.port);
    (host, port)
        .to_socket_addrs()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {host}:{port}: {e}")))?
        .next()
        .ok_or_else(|| StartupError::InvalidConfig(format!("bind address {host}:{port} resolves to nothing")))
}

/// The served application: the router behind trailing-slash normalization.
pub type App = NormalizePath<Router>;

/// Build the application for an already loaded configuration.
///
/// `/api/v1/states/` and `/api/v1/states` reach the same handler.
pub async fn build_app(cfg: &AppConfig) -> Result<App, StartupError> {
    runtime::ensure_env(cfg).await?;
    let storage = storage::connect(cfg).await?;
    let router = routes::build_router(AppState::new(storage), build_cors());
    Ok(NormalizePath::trim_trailing_slash(router))
}

/// Serve `app` on an already bound listener until the server stops.
pub async fn serve(listener: tokio::net::TcpListener, app: App) -> std::io::Result<()> {
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await
}

/// Public entry: load configuration, connect storage and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();

    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let app = build_app(&cfg).await?;

    // Bind and serve
    let addr = load_bind_addr(&cfg)?;
    info!(service = "server", %addr, mode = %cfg.storage.mode, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve(listener, app).await?;
    Ok(())
}
