//! Process-wide matchmaking queue.

pub mod queue;

pub use queue::MatchQueue;
