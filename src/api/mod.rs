//! REST API for load-profile generation.
//!
//! Endpoints:
//! - `POST /getloadprofile`: generate a profile from a JSON request
//! - `GET /health`: liveness probe
//! - `GET /version`: service name and version

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::engine::Engine;

pub use types::{DataResponse, ErrorResponse};

/// Application state shared across all request handlers.
///
/// The engine is read-only apart from its trace cache, so no locks are
/// needed at this level.
pub struct AppState {
    /// Engine serving every request.
    pub engine: Engine,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/getloadprofile", post(handlers::get_load_profile))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
