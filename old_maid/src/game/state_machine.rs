//! Old Maid match state machine.
//!
//! A [`Match`] is synchronous and owns everything a single room needs: the
//! seats, their hands, the turn pointer and the match RNG. Every transition
//! queues the events it produces; the owner drains them with
//! [`Match::drain_events`] and delivers them however it likes. Timers are
//! not handled here. The owner arms them using [`Match::turn_seq`] and calls
//! [`Match::take_timeout_turn`] on expiry.

use log::{debug, error};
use rand::{Rng, rngs::StdRng};
use serde::Serialize;
use std::{collections::VecDeque, time::Duration};
use thiserror::Error;

use super::{
    constants::ROOM_SIZE,
    entities::{Card, ConnectionId, Deck, Hand, Nickname, RoomId, SeatIndex},
    functional,
};
use crate::net::messages::{
    ActionLog, CardDrawn, GameOver, GameStart, OutcomeKind, Outbound, Recipient, ServerEvent,
    StateUpdate, TimerReset,
};

/// Broken match invariants. Any of these means the dealing or rotation
/// logic has a bug, and the room should be aborted.
#[derive(Debug, Eq, Error, PartialEq)]
pub enum GameError {
    #[error("every hand was empty after the deal")]
    EmptyDeal,
    #[error("no seat holds cards after seat {from}")]
    NoNextTurn { from: SeatIndex },
    #[error("no survivors at the end of the match")]
    NoSurvivors,
    #[error("resolved target seat {seat} holds no cards")]
    EmptyTarget { seat: SeatIndex },
    #[error("seat {seat} is on turn with an empty hand")]
    EmptyTurn { seat: SeatIndex },
    #[error("need exactly {expected} players, got {actual}")]
    WrongPlayerCount { expected: usize, actual: usize },
}

/// Why an action was ignored. Rejections never change match state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Rejection {
    NotYourTurn,
    MatchOver,
}

/// How a finished match ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// The only seat still holding cards.
    Loser(SeatIndex),
    Ambiguous,
    Aborted,
}

impl MatchOutcome {
    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Loser(_) => OutcomeKind::Loser,
            Self::Ambiguous => OutcomeKind::Ambiguous,
            Self::Aborted => OutcomeKind::Aborted,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TurnOutcome {
    Rejected(Rejection),
    Continued { next_turn: SeatIndex },
    Finished(MatchOutcome),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Dealing,
    AwaitingAction,
    Resolving,
    Terminal(MatchOutcome),
}

#[derive(Debug)]
struct Seat {
    connection: ConnectionId,
    nickname: Nickname,
    hand: Hand,
    connected: bool,
}

/// Read-only summary of a match, safe to show to anyone.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    #[serde(rename = "roomID")]
    pub room_id: RoomId,
    pub phase: Phase,
    pub turn_index: SeatIndex,
    pub player_counts: Vec<usize>,
    pub players: Vec<Nickname>,
    pub connected: Vec<bool>,
    pub turn_seq: u64,
}

#[derive(Debug)]
pub struct Match {
    room_id: RoomId,
    seats: Vec<Seat>,
    turn: SeatIndex,
    turn_seq: u64,
    phase: Phase,
    rng: StdRng,
    turn_timeout: Duration,
    events: VecDeque<Outbound>,
}

impl Match {
    /// Deal `deck` as-is to the players in seat order and open the first
    /// turn.
    ///
    /// Cards go out one at a time starting at seat 0, every hand is
    /// reduced, and the first seat from 0 that still holds cards acts
    /// first. The deck is not shuffled here.
    pub fn start(
        room_id: RoomId,
        players: Vec<(ConnectionId, Nickname)>,
        deck: Deck,
        rng: StdRng,
        turn_timeout: Duration,
    ) -> Result<Self, GameError> {
        if players.len() != ROOM_SIZE {
            return Err(GameError::WrongPlayerCount {
                expected: ROOM_SIZE,
                actual: players.len(),
            });
        }

        let mut seats: Vec<Seat> = players
            .into_iter()
            .map(|(connection, nickname)| Seat {
                connection,
                nickname,
                hand: Hand::new(),
                connected: true,
            })
            .collect();

        let num_seats = seats.len();
        for (i, card) in deck.into_cards().into_iter().enumerate() {
            seats[i % num_seats].hand.push(card);
        }
        for seat in &mut seats {
            seat.hand.reduce_pairs();
        }

        let mut game = Self {
            room_id,
            seats,
            turn: 0,
            turn_seq: 0,
            phase: Phase::Dealing,
            rng,
            turn_timeout,
            events: VecDeque::new(),
        };

        let Some(first) = functional::next_occupied_seat(&game.counts(), 0, false) else {
            error!("Room {}: every hand is empty after the deal", game.room_id);
            return Err(GameError::EmptyDeal);
        };
        game.turn = first;

        let players = game.nicknames();
        for (seat_idx, seat) in game.seats.iter().enumerate() {
            game.events.push_back(Outbound {
                to: Recipient::Seat(seat_idx),
                event: ServerEvent::GameStart(GameStart {
                    room_id: game.room_id.clone(),
                    my_index: seat_idx,
                    players: players.clone(),
                    hand: seat.hand.cards().to_vec(),
                }),
            });
        }
        game.phase = Phase::AwaitingAction;
        game.push_state_updates();
        game.push_timer_reset();

        debug!(
            "Room {}: dealt {:?}, seat {} opens",
            game.room_id,
            game.counts(),
            game.turn
        );
        Ok(game)
    }

    /// Have `actor` draw from `target` (or the next seat with cards) at
    /// `card_index` (or a random position).
    ///
    /// Stale or out-of-range choices are corrected rather than refused; only
    /// an actor who doesn't hold the turn is rejected. A turn resting on an
    /// empty hand is a rotation bug and fails with [`GameError::EmptyTurn`].
    pub fn take_turn(
        &mut self,
        actor: &ConnectionId,
        target: Option<SeatIndex>,
        card_index: Option<usize>,
    ) -> Result<TurnOutcome, GameError> {
        if self.is_over() {
            return Ok(TurnOutcome::Rejected(Rejection::MatchOver));
        }
        if self.seats[self.turn].connection != *actor {
            return Ok(TurnOutcome::Rejected(Rejection::NotYourTurn));
        }
        if self.seats[self.turn].hand.is_empty() {
            error!(
                "Room {}: seat {} holds the turn with no cards",
                self.room_id, self.turn
            );
            return Err(GameError::EmptyTurn { seat: self.turn });
        }

        self.phase = Phase::Resolving;
        let actor_seat = self.turn;
        let counts = self.counts();

        let target = target
            .filter(|&seat| seat < counts.len() && seat != actor_seat && counts[seat] > 0)
            .or_else(|| functional::next_occupied_seat(&counts, actor_seat, true));

        match target {
            Some(target) => self.draw(actor_seat, target, card_index)?,
            None => {
                let msg = format!(
                    "{} has no one left to draw from",
                    self.seats[actor_seat].nickname
                );
                self.push_room(ServerEvent::ActionLog(ActionLog { msg }));
            }
        }
        self.turn_seq += 1;

        let counts = self.counts();
        let survivors = functional::survivors(&counts);
        if survivors.len() <= 1 {
            let outcome = match survivors.as_slice() {
                [loser] => MatchOutcome::Loser(*loser),
                _ => {
                    error!("Room {}: match ended with no survivors", self.room_id);
                    MatchOutcome::Ambiguous
                }
            };
            self.phase = Phase::Terminal(outcome);
            self.push_state_updates();
            return Ok(TurnOutcome::Finished(outcome));
        }

        let Some(next) = functional::next_occupied_seat(&counts, actor_seat, true) else {
            return Err(GameError::NoNextTurn { from: actor_seat });
        };
        self.turn = next;
        self.phase = Phase::AwaitingAction;
        self.push_state_updates();
        self.push_timer_reset();
        Ok(TurnOutcome::Continued { next_turn: next })
    }

    /// The turn timer expired: play for the current seat with no choices.
    pub fn take_timeout_turn(&mut self) -> Result<TurnOutcome, GameError> {
        if self.is_over() {
            return Ok(TurnOutcome::Rejected(Rejection::MatchOver));
        }
        let actor = self.seats[self.turn].connection;
        debug!("Room {}: seat {} timed out", self.room_id, self.turn);
        self.take_turn(&actor, None, None)
    }

    fn draw(
        &mut self,
        actor: SeatIndex,
        target: SeatIndex,
        card_index: Option<usize>,
    ) -> Result<(), GameError> {
        let len = self.seats[target].hand.len();
        if len == 0 {
            return Err(GameError::EmptyTarget { seat: target });
        }
        let idx = card_index
            .filter(|&i| i < len)
            .unwrap_or_else(|| self.rng.random_range(0..len));
        let card = self.seats[target]
            .hand
            .take(idx)
            .ok_or(GameError::EmptyTarget { seat: target })?;

        let is_pair = self.seats[actor].hand.contains_rank(card.rank());
        self.seats[actor].hand.push(card);
        self.seats[actor].hand.reduce_pairs();

        self.events.push_back(Outbound {
            to: Recipient::Seat(actor),
            event: ServerEvent::CardDrawnAnimate(CardDrawn { card, is_pair }),
        });
        let msg = format!(
            "{} drew a card from {}",
            self.seats[actor].nickname, self.seats[target].nickname
        );
        self.push_room(ServerEvent::ActionLog(ActionLog { msg }));

        debug!(
            "Room {}: seat {actor} drew {card} from seat {target} (pair: {is_pair})",
            self.room_id
        );
        Ok(())
    }

    /// Queue `game_over`. Called by the owner once the display-grace delay
    /// after the terminal transition has passed.
    pub fn announce_outcome(&mut self) {
        let Phase::Terminal(outcome) = self.phase else {
            return;
        };
        let loser = match outcome {
            MatchOutcome::Loser(seat) => Some(self.seats[seat].nickname.clone()),
            MatchOutcome::Ambiguous | MatchOutcome::Aborted => None,
        };
        self.push_room(ServerEvent::GameOver(GameOver {
            loser,
            outcome: outcome.kind(),
        }));
    }

    /// Force the match into the aborted terminal state.
    pub fn abort(&mut self) {
        self.phase = Phase::Terminal(MatchOutcome::Aborted);
    }

    /// Mark the seat held by `connection` as gone. The seat keeps its hand
    /// and its turns; they are played out by the turn timer.
    pub fn disconnect(&mut self, connection: &ConnectionId) -> Option<SeatIndex> {
        let seat = self.seat_of(connection)?;
        self.seats[seat].connected = false;
        Some(seat)
    }

    #[must_use]
    pub fn seat_of(&self, connection: &ConnectionId) -> Option<SeatIndex> {
        self.seats.iter().position(|s| s.connection == *connection)
    }

    #[must_use]
    pub fn is_connected(&self, seat: SeatIndex) -> bool {
        self.seats.get(seat).is_some_and(|s| s.connected)
    }

    #[must_use]
    pub fn all_disconnected(&self) -> bool {
        self.seats.iter().all(|s| !s.connected)
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Terminal(_))
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    #[must_use]
    pub fn turn(&self) -> SeatIndex {
        self.turn
    }

    /// Bumped by every resolved action. A timer armed under an older value
    /// is stale.
    #[must_use]
    pub fn turn_seq(&self) -> u64 {
        self.turn_seq
    }

    #[must_use]
    pub fn turn_timeout(&self) -> Duration {
        self.turn_timeout
    }

    #[must_use]
    pub fn current_connection(&self) -> ConnectionId {
        self.seats[self.turn].connection
    }

    #[must_use]
    pub fn hand(&self, seat: SeatIndex) -> Option<&[Card]> {
        self.seats.get(seat).map(|s| s.hand.cards())
    }

    #[must_use]
    pub fn counts(&self) -> Vec<usize> {
        self.seats.iter().map(|s| s.hand.len()).collect()
    }

    #[must_use]
    pub fn nicknames(&self) -> Vec<Nickname> {
        self.seats.iter().map(|s| s.nickname.clone()).collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            room_id: self.room_id.clone(),
            phase: self.phase,
            turn_index: self.turn,
            player_counts: self.counts(),
            players: self.nicknames(),
            connected: self.seats.iter().map(|s| s.connected).collect(),
            turn_seq: self.turn_seq,
        }
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = Outbound> + '_ {
        self.events.drain(..)
    }

    fn push_room(&mut self, event: ServerEvent) {
        self.events.push_back(Outbound {
            to: Recipient::Room,
            event,
        });
    }

    fn push_state_updates(&mut self) {
        let player_counts = self.counts();
        for (seat_idx, seat) in self.seats.iter().enumerate() {
            self.events.push_back(Outbound {
                to: Recipient::Seat(seat_idx),
                event: ServerEvent::StateUpdate(StateUpdate {
                    turn_index: self.turn,
                    player_counts: player_counts.clone(),
                    my_hand: seat.hand.cards().to_vec(),
                }),
            });
        }
    }

    fn push_timer_reset(&mut self) {
        self.push_room(ServerEvent::TimerReset(TimerReset {
            duration: self.turn_timeout.as_secs(),
        }));
    }
}
