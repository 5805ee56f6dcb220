//! Wire protocol between clients and the server.
//!
//! Every frame is a JSON object with a discriminating `event` name and a
//! `data` payload. Field names follow the camelCase shape browser clients
//! already speak (`roomID`, `targetIndex`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::entities::{Card, Nickname, RoomId, SeatIndex};

/// A message from a client to the server.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Enter the matchmaking queue.
    JoinGame(JoinRequest),
    /// Draw a card from another player's hand. Everything but the room is
    /// optional; the server fills in missing or stale choices.
    DrawCard(DrawRequest),
}

/// `join_game` accepts either `{"nickname": ...}` or a bare string.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JoinRequest {
    Named { nickname: Option<String> },
    Bare(String),
}

impl JoinRequest {
    #[must_use]
    pub fn nickname(self) -> Nickname {
        match self {
            Self::Named { nickname } => Nickname::from(nickname),
            Self::Bare(nickname) => Nickname::new(&nickname),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawRequest {
    #[serde(rename = "roomID")]
    pub room_id: RoomId,
    // Signed so that a client sending -1 for "none" is treated as no
    // choice rather than a malformed frame.
    pub target_index: Option<i64>,
    pub card_index: Option<i64>,
}

impl DrawRequest {
    #[must_use]
    pub fn target(&self) -> Option<SeatIndex> {
        self.target_index.and_then(|i| usize::try_from(i).ok())
    }

    #[must_use]
    pub fn card(&self) -> Option<usize> {
        self.card_index.and_then(|i| usize::try_from(i).ok())
    }
}

/// A message from the server to a client. Clients such as the bots
/// deserialize the same type.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Current matchmaking queue length. Sent to everyone queued.
    WaitingStatus(usize),
    /// The recipient was seated in a new room.
    GameStart(GameStart),
    /// Private to the player who just drew.
    CardDrawnAnimate(CardDrawn),
    ActionLog(ActionLog),
    /// A fresh turn countdown started.
    TimerReset(TimerReset),
    /// Post-transition view, personalised with the recipient's own hand.
    StateUpdate(StateUpdate),
    GameOver(GameOver),
    /// The recipient sent something the server could not use.
    Error(ErrorMessage),
}

impl ServerEvent {
    /// The wire name of the event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::WaitingStatus(_) => "waiting_status",
            Self::GameStart(_) => "game_start",
            Self::CardDrawnAnimate(_) => "card_drawn_animate",
            Self::ActionLog(_) => "action_log",
            Self::TimerReset(_) => "timer_reset",
            Self::StateUpdate(_) => "state_update",
            Self::GameOver(_) => "game_over",
            Self::Error(_) => "error",
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStart {
    #[serde(rename = "roomID")]
    pub room_id: RoomId,
    pub my_index: SeatIndex,
    pub players: Vec<Nickname>,
    pub hand: Vec<Card>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDrawn {
    pub card: Card,
    /// Whether the drawn card completed a pair. Purely cosmetic.
    pub is_pair: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ActionLog {
    pub msg: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TimerReset {
    /// Seconds.
    pub duration: u64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateUpdate {
    pub turn_index: SeatIndex,
    pub player_counts: Vec<usize>,
    pub my_hand: Vec<Card>,
}

/// How a match ended.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// One player was left holding cards.
    Loser,
    /// Nobody was left holding cards.
    Ambiguous,
    /// The room hit an internal error and was torn down.
    Aborted,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Loser => "loser",
            Self::Ambiguous => "ambiguous",
            Self::Aborted => "aborted",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameOver {
    pub loser: Option<Nickname>,
    pub outcome: OutcomeKind,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ErrorMessage {
    pub message: String,
}

impl ErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Who an event produced by a match should be delivered to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Recipient {
    Seat(SeatIndex),
    Room,
}

/// An event produced by a match together with its audience.
#[derive(Clone, Debug, PartialEq)]
pub struct Outbound {
    pub to: Recipient,
    pub event: ServerEvent,
}
