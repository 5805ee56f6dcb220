//! HTTP/WebSocket API for the Old Maid server.
//!
//! # Endpoints
//!
//! - `GET /health` - server status with room and queue counts
//! - `GET /ws` - WebSocket carrying the JSON game protocol
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use om_server::api::{AppState, create_router};
//! use old_maid::{RoomConfig, RoomManager};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = AppState {
//!     room_manager: Arc::new(RoomManager::new(RoomConfig::default())),
//! };
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is permissive: the browser client may be served from anywhere.

pub mod rate_limiter;
pub mod request_id;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use old_maid::RoomManager;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::metrics;
use request_id::RequestId;

/// Application state shared across all HTTP handlers and WebSocket connections.
#[derive(Clone)]
pub struct AppState {
    pub room_manager: Arc<RoomManager>,
}

/// Build the router with every endpoint and middleware applied.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"status":"healthy","version":"0.4.2","active_rooms":2,"queue_len":1,"timestamp":"..."}
/// ```
async fn health_check(State(state): State<AppState>, request_id: RequestId) -> impl IntoResponse {
    let active_rooms = state.room_manager.active_room_count().await;
    let queue_len = state.room_manager.queue_len().await;
    tracing::debug!(request_id = request_id.as_str(), active_rooms, queue_len, "Health check");
    metrics::active_rooms(active_rooms);
    metrics::queue_length(queue_len);

    let response = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "active_rooms": active_rooms,
        "queue_len": queue_len,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(response))
}
