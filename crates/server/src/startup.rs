use axum::http::{header, Method};
use axum::Router;
use common::env::check_static_dir;
use configs::AppConfig;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};

/// Any origin; only the methods and headers the API uses.
pub fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Build the app from `config` and serve it until the listener fails.
pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let state = ServerState::from_config(config)?;

    let static_dir = match &config.server.static_dir {
        Some(dir) if check_static_dir(dir).await => Some(dir.clone()),
        _ => None,
    };
    if config.store.service_key.is_none() {
        warn!("no service key configured; store calls use the anon key");
    }
    if config.cache.url.is_some() {
        info!("cache url configured but unused");
    }

    let app: Router = routes::build_router(state, build_cors(), static_dir);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(addr.as_str())
        .await
        .map_err(|source| StartupError::Bind { addr: addr.clone(), source })?;
    info!(addr = %listener.local_addr()?, identity_url = %config.identity.url, "starting server");
    axum::serve(listener, app).await?;
    Ok(())
}
