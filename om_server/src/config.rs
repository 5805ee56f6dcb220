//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use old_maid::{RoomConfig, entities::DeckConfig};
use std::{
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};

const DEFAULT_BIND: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
    3000,
);

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP/WebSocket bind address
    pub bind: SocketAddr,
    /// Prometheus exporter bind address, if metrics are enabled
    pub metrics_bind: Option<SocketAddr>,
    /// Settings for every room
    pub room: RoomConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// CLI overrides win over the environment, which wins over defaults.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        deck_override: Option<String>,
        seed_override: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => bind_from_env()?,
        };

        let metrics_bind = parse_env_opt("METRICS_BIND")?;

        let deck_preset = deck_override.or_else(|| std::env::var("DECK_PRESET").ok());
        let deck = match deck_preset {
            Some(name) => DeckConfig::from_preset(&name).ok_or_else(|| ConfigError::Invalid {
                var: "DECK_PRESET".to_string(),
                reason: format!("Unknown preset '{name}', expected 'standard' or 'quick'"),
            })?,
            None => DeckConfig::default(),
        };

        let seed = match seed_override {
            Some(seed) => Some(seed),
            None => parse_env_opt("RNG_SEED")?,
        };

        let defaults = RoomConfig::default();
        let room = RoomConfig {
            turn_timeout: Duration::from_secs(
                parse_env_opt("TURN_TIMEOUT_SECS")?.unwrap_or(defaults.turn_timeout.as_secs()),
            ),
            game_over_delay: Duration::from_millis(
                parse_env_opt("GAME_OVER_DELAY_MS")?
                    .unwrap_or(defaults.game_over_delay.as_millis() as u64),
            ),
            deck,
            seed,
        };

        Ok(ServerConfig {
            bind,
            metrics_bind,
            room,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secs = self.room.turn_timeout.as_secs();
        if !(1..=300).contains(&secs) {
            return Err(ConfigError::Invalid {
                var: "TURN_TIMEOUT_SECS".to_string(),
                reason: format!("Must be between 1 and 300, got {secs}"),
            });
        }

        if self.room.game_over_delay > Duration::from_secs(60) {
            return Err(ConfigError::Invalid {
                var: "GAME_OVER_DELAY_MS".to_string(),
                reason: "Must be at most 60000".to_string(),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        self.room.validate().map_err(|reason| ConfigError::Invalid {
            var: "DECK_PRESET".to_string(),
            reason,
        })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// `SERVER_BIND`, else `0.0.0.0:$PORT`, else the local default.
fn bind_from_env() -> Result<SocketAddr, ConfigError> {
    if let Some(bind) = parse_env_opt("SERVER_BIND")? {
        return Ok(bind);
    }
    match parse_env_opt::<u16>("PORT")? {
        Some(port) => Ok(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))),
        None => Ok(DEFAULT_BIND),
    }
}

/// Optional variable that must parse when present.
fn parse_env_opt<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::Invalid {
                    var: key.to_string(),
                    reason: e.to_string(),
                })
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 7] = [
        "SERVER_BIND",
        "PORT",
        "METRICS_BIND",
        "DECK_PRESET",
        "RNG_SEED",
        "TURN_TIMEOUT_SECS",
        "GAME_OVER_DELAY_MS",
    ];

    fn clear_env() {
        for var in VARS {
            // SAFETY: env-mutating tests are serialized with #[serial].
            unsafe { std::env::remove_var(var) };
        }
    }

    fn set_env(key: &str, value: &str) {
        // SAFETY: env-mutating tests are serialized with #[serial].
        unsafe { std::env::set_var(key, value) };
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            var: "DECK_PRESET".to_string(),
            reason: "Unknown preset".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DECK_PRESET"));
        assert!(msg.contains("Unknown preset"));
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = ServerConfig::from_env(None, None, None).unwrap();
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.metrics_bind, None);
        assert_eq!(config.room, RoomConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        set_env("SERVER_BIND", "0.0.0.0:8080");
        set_env("DECK_PRESET", "quick");
        set_env("RNG_SEED", "99");
        set_env("TURN_TIMEOUT_SECS", "5");
        set_env("GAME_OVER_DELAY_MS", "250");

        let config = ServerConfig::from_env(None, None, None).unwrap();
        assert_eq!(config.bind, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.room.deck, DeckConfig::quick());
        assert_eq!(config.room.seed, Some(99));
        assert_eq!(config.room.turn_timeout, Duration::from_secs(5));
        assert_eq!(config.room.game_over_delay, Duration::from_millis(250));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_port_fallback_binds_all_interfaces() {
        clear_env();
        set_env("PORT", "4100");
        let config = ServerConfig::from_env(None, None, None).unwrap();
        assert_eq!(config.bind, "0.0.0.0:4100".parse().unwrap());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_cli_overrides_win() {
        clear_env();
        set_env("DECK_PRESET", "standard");
        set_env("RNG_SEED", "1");
        let config = ServerConfig::from_env(
            Some("127.0.0.1:9000".parse().unwrap()),
            Some("quick".to_string()),
            Some(7),
        )
        .unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.room.deck, DeckConfig::quick());
        assert_eq!(config.room.seed, Some(7));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values_are_reported() {
        clear_env();
        set_env("DECK_PRESET", "tarot");
        let err = ServerConfig::from_env(None, None, None).unwrap_err();
        assert!(err.to_string().contains("DECK_PRESET"));

        clear_env();
        set_env("SERVER_BIND", "not-an-address");
        let err = ServerConfig::from_env(None, None, None).unwrap_err();
        assert!(err.to_string().contains("SERVER_BIND"));

        clear_env();
        set_env("RNG_SEED", "-4");
        assert!(ServerConfig::from_env(None, None, None).is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_malformed_timings_are_rejected() {
        clear_env();
        set_env("TURN_TIMEOUT_SECS", "abc");
        let err = ServerConfig::from_env(None, None, None).unwrap_err();
        assert!(err.to_string().contains("TURN_TIMEOUT_SECS"));

        clear_env();
        set_env("GAME_OVER_DELAY_MS", "2s");
        let err = ServerConfig::from_env(None, None, None).unwrap_err();
        assert!(err.to_string().contains("GAME_OVER_DELAY_MS"));
        clear_env();
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let config = ServerConfig {
            bind: DEFAULT_BIND,
            metrics_bind: None,
            room: RoomConfig {
                turn_timeout: Duration::ZERO,
                ..RoomConfig::default()
            },
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("TURN_TIMEOUT_SECS"));
    }

    #[test]
    fn test_validation_rejects_shared_metrics_port() {
        let config = ServerConfig {
            bind: DEFAULT_BIND,
            metrics_bind: Some(DEFAULT_BIND),
            room: RoomConfig::default(),
        };
        assert!(config.validate().is_err());
    }
}
