//! Old Maid game engine.
//!
//! - Cards, decks, hands and identities
//! - Pair removal and seat rotation helpers
//! - The per-room match state machine

pub mod constants;
pub mod entities;
pub mod functional;
pub mod state_machine;

pub use state_machine::{
    GameError, Match, MatchOutcome, MatchSnapshot, Phase, Rejection, TurnOutcome,
};
