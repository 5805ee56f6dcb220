//! Room manager for matchmaking and spawning room actors.

use log::{debug, error, info};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::sync::{Mutex, RwLock, oneshot};

use super::{
    actor::{RoomActor, RoomHandle},
    config::RoomConfig,
    messages::{RoomError, RoomMessage},
};
use crate::{
    game::{
        MatchSnapshot,
        entities::{ConnectionId, RoomId, SeatIndex},
    },
    matchmaking::MatchQueue,
    net::{
        connection::Connection,
        messages::{GameOver, OutcomeKind, ServerEvent},
    },
};

/// Registry of the matchmaking queue and every running room.
///
/// Shared behind an `Arc` by every connection task. Contention is limited
/// to the queue lock and short registry lookups; match state itself lives
/// in the room actors.
pub struct RoomManager {
    config: RoomConfig,

    queue: Mutex<MatchQueue>,

    /// Active room handles
    rooms: Arc<RwLock<HashMap<RoomId, RoomHandle>>>,

    /// Which room each seated connection belongs to
    members: Arc<RwLock<HashMap<ConnectionId, RoomId>>>,

    /// Rooms created so far, used to derive per-room seeds
    rooms_created: AtomicU64,
}

impl RoomManager {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            queue: Mutex::new(MatchQueue::new()),
            rooms: Arc::new(RwLock::new(HashMap::new())),
            members: Arc::new(RwLock::new(HashMap::new())),
            rooms_created: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Put a connection in the matchmaking queue.
    ///
    /// Returns the new room's id when this join completed a block.
    pub async fn enqueue(&self, connection: Connection) -> Option<RoomId> {
        debug!("Connection {} ({}) queued", connection.id, connection.nickname);
        // Held until the room is registered, so a disconnect can't slip
        // between leaving the queue and joining the room.
        let mut queue = self.queue.lock().await;
        let block = queue.push(connection)?;
        self.spawn_room(block).await
    }

    /// Take a connection out of the queue. A no-op for unknown or already
    /// seated connections.
    pub async fn dequeue(&self, connection: &ConnectionId) -> bool {
        self.queue.lock().await.remove(connection)
    }

    async fn spawn_room(&self, connections: Vec<Connection>) -> Option<RoomId> {
        let room_id = RoomId::generate();
        let room_number = self.rooms_created.fetch_add(1, Ordering::Relaxed);
        let rng = self.config.rng_for(room_number);
        let seated: Vec<ConnectionId> = connections.iter().map(|c| c.id).collect();

        let (actor, handle) =
            match RoomActor::new(room_id.clone(), &self.config, connections.clone(), rng) {
                Ok(spawned) => spawned,
                Err(e) => {
                    error!("Room {room_id} failed to start: {e}");
                    let aborted = ServerEvent::GameOver(GameOver {
                        loser: None,
                        outcome: OutcomeKind::Aborted,
                    });
                    for connection in &connections {
                        connection.send(aborted.clone());
                    }
                    return None;
                }
            };

        self.rooms.write().await.insert(room_id.clone(), handle);
        self.members
            .write()
            .await
            .extend(seated.iter().map(|id| (*id, room_id.clone())));

        let rooms = Arc::clone(&self.rooms);
        let members = Arc::clone(&self.members);
        let finished = room_id.clone();
        tokio::spawn(async move {
            actor.run().await;
            rooms.write().await.remove(&finished);
            members.write().await.retain(|_, room| *room != finished);
            debug!("Room {finished} removed from registry");
        });

        info!("Created room {room_id} (#{room_number})");
        Some(room_id)
    }

    /// Get a room handle
    pub async fn get_room(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.read().await.get(room_id).cloned()
    }

    /// Room the connection is currently seated in
    pub async fn room_of(&self, connection: &ConnectionId) -> Option<RoomId> {
        self.members.read().await.get(connection).cloned()
    }

    /// Forward a draw request to its room. The room decides whether it is
    /// the caller's turn.
    pub async fn submit_action(
        &self,
        room_id: &RoomId,
        connection: ConnectionId,
        target_index: Option<SeatIndex>,
        card_index: Option<usize>,
    ) -> Result<(), RoomError> {
        let handle = self
            .get_room(room_id)
            .await
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        handle
            .send(RoomMessage::Action {
                connection,
                target_index,
                card_index,
            })
            .await
    }

    /// Transport hook: the connection is gone, wherever it was.
    pub async fn disconnect(&self, connection: &ConnectionId) {
        if self.dequeue(connection).await {
            debug!("Connection {connection} left the queue");
            return;
        }

        let Some(room_id) = self.members.write().await.remove(connection) else {
            return;
        };
        let Some(handle) = self.get_room(&room_id).await else {
            return;
        };
        let message = RoomMessage::Disconnect {
            connection: *connection,
        };
        if let Err(e) = handle.send(message).await {
            debug!("Room {room_id} gone before disconnect of {connection}: {e}");
        }
    }

    pub async fn snapshot(&self, room_id: &RoomId) -> Result<MatchSnapshot, RoomError> {
        let handle = self
            .get_room(room_id)
            .await
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        let (tx, rx) = oneshot::channel();
        handle.send(RoomMessage::GetSnapshot { response: tx }).await?;
        rx.await.map_err(|_| RoomError::Closed)
    }

    /// Stop a room without announcing an outcome.
    pub async fn close_room(&self, room_id: &RoomId) -> Result<(), RoomError> {
        let handle = self
            .get_room(room_id)
            .await
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        let (tx, rx) = oneshot::channel();
        handle.send(RoomMessage::Close { response: tx }).await?;
        rx.await.map_err(|_| RoomError::Closed)?;

        info!("Closed room {room_id}");
        Ok(())
    }

    pub async fn active_room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn queue_len(&self) -> usize {
        self.queue.lock().await.len()
    }
}
