//! Headless Old Maid bots for smoke and load testing a server.
//!
//! Each bot opens its own WebSocket, joins the queue, and draws whenever the
//! server says it is on turn.

mod bot;

use std::time::Duration;

use anyhow::{Context, Error, bail};
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use pico_args::Arguments;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use bot::{Bot, Reaction};

const HELP: &str = "\
Run bots against an Old Maid server

USAGE:
  om_bots [OPTIONS]

OPTIONS:
  --server     URL         WebSocket endpoint  [default: ws://127.0.0.1:3000/ws]
  --bots       N           Number of bots to connect  [default: 4]
  --games      N           Matches each bot plays before leaving  [default: 1]
  --think-ms   MS          Upper bound on the pause before each draw  [default: 300]
  --seed       N           Seed for bot choices  [default: random]

FLAGS:
  -h, --help               Print help information
";

#[derive(Clone)]
struct Args {
    server: String,
    bots: usize,
    games: usize,
    think_ms: u64,
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        server: pargs
            .opt_value_from_str("--server")?
            .unwrap_or_else(|| "ws://127.0.0.1:3000/ws".to_string()),
        bots: pargs.opt_value_from_str("--bots")?.unwrap_or(4),
        games: pargs.opt_value_from_str("--games")?.unwrap_or(1),
        think_ms: pargs.opt_value_from_str("--think-ms")?.unwrap_or(300),
        seed: pargs.opt_value_from_str("--seed")?,
    };

    env_logger::builder().format_target(false).init();

    if args.bots == 0 {
        bail!("--bots must be at least 1");
    }
    if args.bots % old_maid::ROOM_SIZE != 0 {
        warn!(
            "{} bots do not fill rooms of {}; some will wait for humans",
            args.bots,
            old_maid::ROOM_SIZE
        );
    }

    info!("Starting {} bot(s) against {}", args.bots, args.server);

    let mut handles = Vec::with_capacity(args.bots);
    for n in 0..args.bots {
        let args = args.clone();
        let rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(n as u64)),
            None => StdRng::from_os_rng(),
        };
        handles.push(tokio::spawn(run_bot(n + 1, args, rng)));
    }

    let mut failures = 0;
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("{e:#}");
                failures += 1;
            }
            Err(e) => {
                warn!("Bot task panicked: {e}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} bot(s) failed");
    }
    info!("All bots finished");
    Ok(())
}

async fn run_bot(n: usize, args: Args, mut rng: StdRng) -> Result<(), Error> {
    let mut bot = Bot::new(format!("bot_{n}"));

    let (ws, _) = connect_async(&args.server)
        .await
        .with_context(|| format!("{} failed to connect to {}", bot.nickname, args.server))?;
    let (mut write, mut read) = ws.split();

    for game in 1..=args.games {
        bot.reset();
        let join =
            serde_json::to_string(&bot.join_message()).context("Failed to encode join_game")?;
        write
            .send(Message::text(join))
            .await
            .context("Failed to send join_game")?;
        debug!("{} queued for game {game}", bot.nickname);

        loop {
            let Some(frame) = read.next().await else {
                bail!("{}: server closed the connection", bot.nickname);
            };
            let text = match frame.context("WebSocket error")? {
                Message::Text(text) => text,
                Message::Close(_) => bail!("{}: server closed the connection", bot.nickname),
                _ => continue,
            };

            match bot.react(text.as_str(), &mut rng) {
                Reaction::Ignore => {}
                Reaction::Send(message) => {
                    let frame =
                        serde_json::to_string(&message).context("Failed to encode draw_card")?;
                    if args.think_ms > 0 {
                        let pause = rng.random_range(0..=args.think_ms);
                        tokio::time::sleep(Duration::from_millis(pause)).await;
                    }
                    write
                        .send(Message::text(frame))
                        .await
                        .context("Failed to send draw_card")?;
                }
                Reaction::Finished(result) => {
                    let loser = result
                        .loser
                        .as_ref()
                        .map_or("nobody", |loser| loser.as_str());
                    info!(
                        "{} finished game {game} after {} draw(s): {} ({loser})",
                        bot.nickname, bot.draws, result.outcome
                    );
                    break;
                }
                Reaction::Rejected(message) => {
                    warn!("{} rejected by server: {message}", bot.nickname);
                }
            }
        }
    }

    let _ = write.close().await;
    Ok(())
}
