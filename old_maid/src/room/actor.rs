//! Room actor implementation with async message handling.

use log::{debug, error, info};
use rand::rngs::StdRng;
use tokio::{
    sync::mpsc,
    time::{Duration, Instant, sleep_until},
};

use super::{
    config::RoomConfig,
    messages::{RoomError, RoomMessage},
};
use crate::{
    game::{
        GameError, Match, TurnOutcome,
        constants::ROOM_INBOX_CAPACITY,
        entities::{Deck, RoomId},
    },
    net::{connection::Connection, messages::Recipient},
};

/// Room actor handle for sending messages
#[derive(Clone, Debug)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    room_id: RoomId,
}

impl RoomHandle {
    pub fn new(sender: mpsc::Sender<RoomMessage>, room_id: RoomId) -> Self {
        Self { sender, room_id }
    }

    #[must_use]
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Send a message to the room
    pub async fn send(&self, message: RoomMessage) -> Result<(), RoomError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| RoomError::Closed)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// The single pending deadline of a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Deadline {
    /// Auto-play for the seat on turn. Armed under `seq`; stale once the
    /// match has moved past it.
    Turn { seq: u64, at: Instant },
    /// Announce the outcome and shut the room down.
    Teardown { at: Instant },
}

impl Deadline {
    fn at(&self) -> Instant {
        match self {
            Self::Turn { at, .. } | Self::Teardown { at } => *at,
        }
    }
}

/// Room actor running a single match
pub struct RoomActor {
    id: RoomId,

    game: Match,

    /// Outbound channels, indexed by seat
    connections: Vec<Connection>,

    inbox: mpsc::Receiver<RoomMessage>,

    turn_timeout: Duration,

    game_over_delay: Duration,

    deadline: Option<Deadline>,

    is_closed: bool,
}

impl RoomActor {
    /// Shuffle a fresh deck and deal it to `connections` in seat order.
    pub fn new(
        id: RoomId,
        config: &RoomConfig,
        connections: Vec<Connection>,
        mut rng: StdRng,
    ) -> Result<(Self, RoomHandle), GameError> {
        let mut deck = Deck::new(&config.deck);
        deck.shuffle(&mut rng);

        let players = connections
            .iter()
            .map(|c| (c.id, c.nickname.clone()))
            .collect();
        let game = Match::start(id.clone(), players, deck, rng, config.turn_timeout)?;

        let (sender, inbox) = mpsc::channel(ROOM_INBOX_CAPACITY);
        let actor = Self {
            id: id.clone(),
            game,
            connections,
            inbox,
            turn_timeout: config.turn_timeout,
            game_over_delay: config.game_over_delay,
            deadline: None,
            is_closed: false,
        };

        Ok((actor, RoomHandle::new(sender, id)))
    }

    /// Run the room actor event loop
    pub async fn run(mut self) {
        info!("Room {} starting", self.id);

        self.flush();
        self.arm_turn_timer();

        loop {
            let deadline = self.deadline;
            tokio::select! {
                message = self.inbox.recv() => match message {
                    Some(message) => self.handle_message(message),
                    None => break,
                },

                () = wait_for(deadline) => self.handle_deadline(deadline),
            }

            if self.is_closed {
                break;
            }
        }

        info!("Room {} closed", self.id);
    }

    fn handle_message(&mut self, message: RoomMessage) {
        match message {
            RoomMessage::Action {
                connection,
                target_index,
                card_index,
            } => {
                let result = self.game.take_turn(&connection, target_index, card_index);
                self.apply(result);
            }

            RoomMessage::Disconnect { connection } => {
                if let Some(seat) = self.game.disconnect(&connection) {
                    info!("Room {}: seat {seat} disconnected", self.id);
                }
                if self.game.all_disconnected() {
                    info!("Room {}: everyone left, closing", self.id);
                    self.is_closed = true;
                }
            }

            RoomMessage::GetSnapshot { response } => {
                let _ = response.send(self.game.snapshot());
            }

            RoomMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    fn handle_deadline(&mut self, deadline: Option<Deadline>) {
        self.deadline = None;
        match deadline {
            Some(Deadline::Turn { seq, .. }) => {
                if seq != self.game.turn_seq() {
                    debug!(
                        "Room {}: discarding stale timer for turn {seq} (now {})",
                        self.id,
                        self.game.turn_seq()
                    );
                    return;
                }
                let result = self.game.take_timeout_turn();
                self.apply(result);
            }
            Some(Deadline::Teardown { .. }) => {
                self.game.announce_outcome();
                self.flush();
                self.is_closed = true;
            }
            None => {}
        }
    }

    /// Deliver the events of a transition and pick the next deadline.
    ///
    /// A rejected action leaves the running turn timer untouched. An
    /// invariant violation aborts the match and closes the room.
    fn apply(&mut self, result: Result<TurnOutcome, GameError>) {
        match result {
            Ok(TurnOutcome::Rejected(reason)) => {
                debug!("Room {}: action rejected ({reason:?})", self.id);
            }
            Ok(TurnOutcome::Continued { next_turn }) => {
                debug!("Room {}: seat {next_turn} to act", self.id);
                self.flush();
                self.arm_turn_timer();
            }
            Ok(TurnOutcome::Finished(outcome)) => {
                info!("Room {}: match finished ({outcome:?})", self.id);
                self.flush();
                self.deadline = Some(Deadline::Teardown {
                    at: Instant::now() + self.game_over_delay,
                });
            }
            Err(e) => {
                error!("Room {}: {e}, aborting", self.id);
                self.game.abort();
                self.game.announce_outcome();
                self.flush();
                self.is_closed = true;
            }
        }
    }

    fn arm_turn_timer(&mut self) {
        self.deadline = Some(Deadline::Turn {
            seq: self.game.turn_seq(),
            at: Instant::now() + self.turn_timeout,
        });
    }

    /// Deliver queued match events. Disconnected seats are skipped.
    fn flush(&mut self) {
        let events: Vec<_> = self.game.drain_events().collect();
        for outbound in events {
            match outbound.to {
                Recipient::Seat(seat) => {
                    if self.game.is_connected(seat) {
                        self.connections[seat].send(outbound.event);
                    }
                }
                Recipient::Room => {
                    for (seat, connection) in self.connections.iter().enumerate() {
                        if self.game.is_connected(seat) {
                            connection.send(outbound.event.clone());
                        }
                    }
                }
            }
        }
    }
}

async fn wait_for(deadline: Option<Deadline>) {
    match deadline {
        Some(deadline) => sleep_until(deadline.at()).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::entities::{DeckConfig, Nickname},
        net::messages::{GameOver, OutcomeKind, ServerEvent},
    };
    use rand::SeedableRng;

    fn quick_config() -> RoomConfig {
        RoomConfig {
            deck: DeckConfig::quick(),
            seed: Some(5),
            ..RoomConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_actor_sends_start_events_on_run() {
        let mut receivers = Vec::new();
        let mut connections = Vec::new();
        for name in ["a", "b", "c", "d"] {
            let (conn, rx) = Connection::channel(Nickname::new(name));
            connections.push(conn);
            receivers.push(rx);
        }
        let (actor, handle) = RoomActor::new(
            RoomId::from("room_t"),
            &quick_config(),
            connections,
            StdRng::seed_from_u64(5),
        )
        .unwrap();
        tokio::spawn(actor.run());

        let first = receivers[0].recv().await.unwrap();
        assert_eq!(first.name(), "game_start");

        let (tx, rx) = tokio::sync::oneshot::channel();
        handle.send(RoomMessage::Close { response: tx }).await.unwrap();
        rx.await.unwrap();
        assert!(matches!(
            receivers[0].recv().await,
            Some(ServerEvent::StateUpdate(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invariant_violation_aborts_room() {
        let mut receivers = Vec::new();
        let mut connections = Vec::new();
        for name in ["a", "b", "c", "d"] {
            let (conn, rx) = Connection::channel(Nickname::new(name));
            connections.push(conn);
            receivers.push(rx);
        }
        let (mut actor, _handle) = RoomActor::new(
            RoomId::from("room_broken"),
            &quick_config(),
            connections,
            StdRng::seed_from_u64(5),
        )
        .unwrap();
        actor.flush();
        let seat = actor.game.turn();

        actor.apply(Err(GameError::EmptyTurn { seat }));

        assert!(actor.is_closed);
        assert!(actor.game.is_over());
        for rx in &mut receivers {
            let mut last = None;
            while let Ok(event) = rx.try_recv() {
                last = Some(event);
            }
            assert_eq!(
                last,
                Some(ServerEvent::GameOver(GameOver {
                    loser: None,
                    outcome: OutcomeKind::Aborted,
                }))
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_handle_reports_error() {
        let (sender, inbox) = mpsc::channel(1);
        drop(inbox);
        let handle = RoomHandle::new(sender, RoomId::from("gone"));
        assert!(handle.is_closed());
        let (tx, _rx) = tokio::sync::oneshot::channel();
        assert_eq!(
            handle.send(RoomMessage::Close { response: tx }).await,
            Err(RoomError::Closed)
        );
    }
}
