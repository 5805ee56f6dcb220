//! Prometheus metrics for the Old Maid server.
//!
//! Metrics are recorded through the `metrics` facade and only exported when
//! [`init_metrics`] has installed the Prometheus recorder. Without it every
//! call below is a cheap no-op, which is what the tests rely on.
//!
//! # Metrics Categories
//!
//! - **WebSocket Metrics**: active and total connections, messages received
//! - **Game Metrics**: queue length, active rooms, matches started
//! - **Rate Limiting Metrics**: rejected messages per limiter
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use om_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::websocket_connected();
//! metrics::queue_length(3);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// A socket finished its upgrade.
pub fn websocket_connected() {
    metrics::counter!("websocket_connections_total").increment(1);
    metrics::gauge!("websocket_connections_active").increment(1.0);
}

/// A socket closed, for whatever reason.
pub fn websocket_disconnected() {
    metrics::gauge!("websocket_connections_active").decrement(1.0);
}

/// Increment WebSocket messages received counter.
pub fn websocket_messages_received() {
    metrics::counter!("websocket_messages_received").increment(1);
}

// ============================================================================
// Game Metrics
// ============================================================================

/// Set the number of connections waiting for a room.
pub fn queue_length(len: usize) {
    metrics::gauge!("matchmaking_queue_length").set(len as f64);
}

/// Set current active rooms count.
pub fn active_rooms(count: usize) {
    metrics::gauge!("active_rooms").set(count as f64);
}

pub fn matches_started_total() {
    metrics::counter!("matches_started_total").increment(1);
}

// ============================================================================
// Rate Limiting Metrics
// ============================================================================

/// Increment rate limit hits counter.
pub fn rate_limit_hits_total(limiter: &str) {
    metrics::counter!("rate_limit_hits_total",
        "limiter" => limiter.to_string()
    )
    .increment(1);
}
