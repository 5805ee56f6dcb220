//! # Old Maid
//!
//! Matchmaking and turn engine for a four-player game of Old Maid.
//!
//! Clients join a process-wide queue; every fourth join seats the oldest
//! four waiting players in a new room. A room deals a shuffled deck (one
//! joker plus paired values), strips pairs from every hand and then rotates
//! turns clockwise, skipping players who have run out of cards. On each
//! turn the active player draws one card from the next opponent still
//! holding cards. Whoever is left holding cards at the end loses.
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, hands, pair removal and the per-room [`Match`] state machine
//! - [`matchmaking`]: The FIFO [`MatchQueue`]
//! - [`room`]: Room actors, their turn timers and the [`RoomManager`] registry
//! - [`net`]: JSON wire protocol and per-connection outbound handles
//!
//! ## Example
//!
//! ```
//! use old_maid::{RoomConfig, RoomManager, entities::Nickname, net::connection::Connection};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let manager = RoomManager::new(RoomConfig::default());
//! let (connection, _events) = Connection::channel(Nickname::new("alice"));
//! assert!(manager.enqueue(connection).await.is_none());
//! assert_eq!(manager.queue_len().await, 1);
//! # }
//! ```

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    GameError, Match, MatchOutcome, MatchSnapshot, Phase, Rejection, TurnOutcome,
    constants::{self, ROOM_SIZE},
    entities, functional,
};

/// Matchmaking queue.
pub mod matchmaking;
pub use matchmaking::MatchQueue;

/// Networking components shared by server and clients.
pub mod net;
pub use net::messages;

/// Room actors and the room registry.
pub mod room;
pub use room::{RoomConfig, RoomError, RoomHandle, RoomManager};
