use tokio::sync::mpsc::{self, error::TrySendError};

use super::messages::ServerEvent;
use crate::game::{
    constants::CONNECTION_CHANNEL_CAPACITY,
    entities::{ConnectionId, Nickname},
};

/// A connected client as seen by matchmaking and rooms.
///
/// Pushing an event never blocks the caller. A slow client whose channel is
/// full misses the event; a closed channel is silently ignored, the
/// transport reports the disconnect separately.
#[derive(Clone, Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub nickname: Nickname,
    sender: mpsc::Sender<ServerEvent>,
}

impl Connection {
    pub fn new(id: ConnectionId, nickname: Nickname, sender: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            id,
            nickname,
            sender,
        }
    }

    /// A connection with a fresh id and its receiving half.
    #[must_use]
    pub fn channel(nickname: Nickname) -> (Self, mpsc::Receiver<ServerEvent>) {
        let (sender, receiver) = mpsc::channel(CONNECTION_CHANNEL_CAPACITY);
        (Self::new(ConnectionId::new(), nickname, sender), receiver)
    }

    /// Queue an event for delivery. Returns whether it was queued.
    pub fn send(&self, event: ServerEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                log::warn!(
                    "Connection {} channel full, dropping {}",
                    self.id,
                    event.name()
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                log::debug!("Connection {} closed", self.id);
                false
            }
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
