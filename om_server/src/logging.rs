//! Structured logging configuration.
//!
//! The game library logs through the `log` facade; the subscriber installed
//! here picks those records up alongside the server's own `tracing` events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,hyper=warn,tower_http=warn";

/// Initialize structured logging.
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// ```no_run
/// use om_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    // A second call (tests, embedding) keeps the first subscriber.
    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_ok()
    {
        tracing::debug!("Structured logging initialized");
    }
}

/// Log the settings a server is about to run with.
pub fn log_startup(config: &crate::config::ServerConfig) {
    tracing::info!(
        bind = %config.bind,
        metrics = ?config.metrics_bind,
        deck_size = config.room.deck.size(),
        turn_timeout_secs = config.room.turn_timeout.as_secs(),
        game_over_delay_ms = config.room.game_over_delay.as_millis() as u64,
        seeded = config.room.seed.is_some(),
        "Old Maid server starting"
    );
}
