use std::collections::VecDeque;

use crate::{
    game::{constants::ROOM_SIZE, entities::ConnectionId},
    net::{connection::Connection, messages::ServerEvent},
};

/// FIFO of connections waiting for a room.
///
/// The queue is drained in blocks of exactly [`ROOM_SIZE`]. Connections left
/// behind keep their order.
#[derive(Debug, Default)]
pub struct MatchQueue {
    waiting: VecDeque<Connection>,
}

impl MatchQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a connection and tell everyone queued the new length.
    ///
    /// Returns the oldest [`ROOM_SIZE`] connections once that many are
    /// waiting. A connection that is already queued is not added twice.
    pub fn push(&mut self, connection: Connection) -> Option<Vec<Connection>> {
        if self.contains(&connection.id) {
            log::debug!("Connection {} is already queued", connection.id);
            self.broadcast_len();
            return None;
        }
        self.waiting.push_back(connection);
        self.broadcast_len();

        if self.waiting.len() < ROOM_SIZE {
            return None;
        }
        Some(self.waiting.drain(..ROOM_SIZE).collect())
    }

    /// Remove a waiting connection. Unknown or already matched connections
    /// are ignored.
    pub fn remove(&mut self, id: &ConnectionId) -> bool {
        let Some(pos) = self.waiting.iter().position(|c| c.id == *id) else {
            return false;
        };
        self.waiting.remove(pos);
        self.broadcast_len();
        true
    }

    #[must_use]
    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.waiting.iter().any(|c| c.id == *id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    fn broadcast_len(&self) {
        let len = self.waiting.len();
        for connection in &self.waiting {
            connection.send(ServerEvent::WaitingStatus(len));
        }
    }
}
