//! Rooms: one async actor per running match.
//!
//! Each room runs in its own Tokio task with an mpsc inbox. Client actions,
//! disconnects and the room's own turn deadline are all handled by that one
//! task, so a timer firing and a client action for the same turn are simply
//! ordered rather than raced.
//!
//! The [`RoomManager`] is the explicit process-lifetime registry: it owns
//! the matchmaking queue, spawns a [`RoomActor`] for every full block of
//! players and forgets rooms once their actor exits.

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;

pub use actor::{RoomActor, RoomHandle};
pub use config::RoomConfig;
pub use manager::RoomManager;
pub use messages::{RoomError, RoomMessage};
