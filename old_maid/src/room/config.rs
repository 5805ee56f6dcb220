//! Room configuration.

use rand::{SeedableRng, rngs::StdRng};
use std::time::Duration;

use crate::game::{
    constants::{DEFAULT_GAME_OVER_DELAY_MS, DEFAULT_TURN_TIMEOUT_SECS},
    entities::DeckConfig,
};

/// Settings shared by every room a manager spawns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomConfig {
    /// How long a seat may sit on its turn before the server plays for it
    pub turn_timeout: Duration,

    /// Display-grace delay between the last move and `game_over`
    pub game_over_delay: Duration,

    /// Deck dealt in every room
    pub deck: DeckConfig,

    /// Fixed RNG seed. Room `n` is seeded with `seed + n`; unset means
    /// OS entropy.
    pub seed: Option<u64>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            turn_timeout: Duration::from_secs(DEFAULT_TURN_TIMEOUT_SECS),
            game_over_delay: Duration::from_millis(DEFAULT_GAME_OVER_DELAY_MS),
            deck: DeckConfig::default(),
            seed: None,
        }
    }
}

impl RoomConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.turn_timeout < Duration::from_secs(1) || self.turn_timeout > Duration::from_secs(300)
        {
            return Err("Turn timeout must be between 1 and 300 seconds".to_string());
        }

        if self.game_over_delay > Duration::from_secs(60) {
            return Err("Game over delay must be at most 60 seconds".to_string());
        }

        self.deck.validate()
    }

    /// RNG for the `room_number`-th room created under this config.
    #[must_use]
    pub fn rng_for(&self, room_number: u64) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(room_number)),
            None => StdRng::from_os_rng(),
        }
    }
}
