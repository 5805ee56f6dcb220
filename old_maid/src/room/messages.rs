//! Room actor message types.

use thiserror::Error;
use tokio::sync::oneshot;

use crate::game::{
    MatchSnapshot,
    entities::{ConnectionId, RoomId, SeatIndex},
};

/// Messages that can be sent to a RoomActor
#[derive(Debug)]
pub enum RoomMessage {
    /// Draw request from a seated player. Missing or stale choices are
    /// corrected by the match.
    Action {
        connection: ConnectionId,
        target_index: Option<SeatIndex>,
        card_index: Option<usize>,
    },

    /// The player's transport went away
    Disconnect { connection: ConnectionId },

    GetSnapshot {
        response: oneshot::Sender<MatchSnapshot>,
    },

    /// Stop the room immediately, without announcing an outcome
    Close { response: oneshot::Sender<()> },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("room {0} not found")]
    NotFound(RoomId),
    #[error("room is closed")]
    Closed,
}
