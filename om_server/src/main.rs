//! Old Maid server: matchmaking queue and room actors behind a WebSocket.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Error};
use log::{info, warn};
use old_maid::RoomManager;
use om_server::{api, config::ServerConfig, logging, metrics};
use pico_args::Arguments;

const HELP: &str = "\
Run an Old Maid matchmaking server

USAGE:
  om_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3000]
  --deck       PRESET      Deck preset, standard or quick  [default: env DECK_PRESET or standard]
  --seed       N           Seed for reproducible deals  [default: env RNG_SEED or random]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  PORT                     Port to bind on 0.0.0.0 when SERVER_BIND is unset
  TURN_TIMEOUT_SECS        Seconds before a turn is played automatically
  GAME_OVER_DELAY_MS       Delay between the last draw and game_over
  METRICS_BIND             Prometheus exporter address (disabled when unset)
  RUST_LOG                 Log filter
";

struct Args {
    bind: Option<SocketAddr>,
    deck: Option<String>,
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        deck: pargs.opt_value_from_str("--deck")?,
        seed: pargs.opt_value_from_str("--seed")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.deck, args.seed)?;
    config.validate()?;
    logging::log_startup(&config);

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics exposed at http://{addr}/metrics");
    }

    let room_manager = Arc::new(RoomManager::new(config.room.clone()));
    let app = api::create_router(api::AppState { room_manager });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C, running until killed: {e}");
        std::future::pending::<()>().await;
    }
}
