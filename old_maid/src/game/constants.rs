//! Game-wide constants.

/// Number of players seated in every room. Matchmaking drains the queue
/// in blocks of exactly this size.
pub const ROOM_SIZE: usize = 4;

/// The joker's value. No other card uses it, so it can never pair.
pub const JOKER_VALUE: u8 = 0;

/// Nicknames are truncated to this many characters.
pub const MAX_NICKNAME_LEN: usize = 16;

/// Substituted when a client joins without a usable nickname.
pub const DEFAULT_NICKNAME: &str = "Anonymous";

pub const DEFAULT_TURN_TIMEOUT_SECS: u64 = 15;

/// How long the final board stays up before `game_over` is sent and the
/// room is deleted.
pub const DEFAULT_GAME_OVER_DELAY_MS: u64 = 2_000;

/// Capacity of each room actor's inbox.
pub const ROOM_INBOX_CAPACITY: usize = 100;

/// Capacity of each connection's outbound event channel.
pub const CONNECTION_CHANNEL_CAPACITY: usize = 64;
