//! Client Configuration
//!
//! Read once at startup from `DUEL_*` environment variables. Missing
//! variables fall back to defaults; present but unparseable ones are an
//! error rather than silently ignored.

use std::time::Duration;

use crate::game::state::Player;
use crate::network::connection::{ConnectionConfig, ReconnectPolicy};
use crate::network::session::SessionConfig;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Variable present but not a valid number.
    #[error("{var}: expected a number, got {value:?}")]
    InvalidNumber {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// Server URL is not a WebSocket URL.
    #[error("{var}: expected a ws:// or wss:// URL, got {value:?}")]
    InvalidUrl {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Match server WebSocket URL.
    pub server_url: String,
    /// Local player account id.
    pub player_id: String,
    /// Local player display name.
    pub player_name: String,
    /// Countdown start value.
    pub match_seconds: u32,
    /// Reconnection attempts after a drop.
    pub reconnect_attempts: u32,
    /// Delay between reconnection attempts.
    pub reconnect_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:5000".to_string(),
            player_id: uuid::Uuid::new_v4().to_string(),
            player_name: "player".to_string(),
            match_seconds: 1800,
            reconnect_attempts: 5,
            reconnect_delay: Duration::from_millis(1000),
        }
    }
}

impl ClientConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let server_url = lookup("DUEL_SERVER_URL").unwrap_or(defaults.server_url);
        if !(server_url.starts_with("ws://") || server_url.starts_with("wss://")) {
            return Err(ConfigError::InvalidUrl {
                var: "DUEL_SERVER_URL",
                value: server_url,
            });
        }

        Ok(Self {
            server_url,
            player_id: lookup("DUEL_PLAYER_ID")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.player_id),
            player_name: lookup("DUEL_PLAYER_NAME")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.player_name),
            match_seconds: number(&lookup, "DUEL_MATCH_SECONDS", defaults.match_seconds)?,
            reconnect_attempts: number(&lookup, "DUEL_RECONNECT_ATTEMPTS", defaults.reconnect_attempts)?,
            reconnect_delay: Duration::from_millis(number(
                &lookup,
                "DUEL_RECONNECT_DELAY_MS",
                defaults.reconnect_delay.as_millis() as u64,
            )?),
        })
    }

    /// Local player record.
    pub fn identity(&self) -> Player {
        Player::new(self.player_id.clone(), self.player_name.clone())
    }

    /// Session settings.
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            match_seconds: self.match_seconds,
        }
    }

    /// Connection settings.
    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig {
            reconnect: ReconnectPolicy {
                max_attempts: self.reconnect_attempts,
                delay: self.reconnect_delay,
            },
            ..Default::default()
        }
    }
}

fn number<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(vars(&[])).unwrap();
        assert_eq!(config.server_url, "ws://127.0.0.1:5000");
        assert_eq!(config.player_name, "player");
        assert_eq!(config.match_seconds, 1800);
        assert_eq!(config.connection().reconnect, ReconnectPolicy::default());
        assert!(uuid::Uuid::parse_str(&config.player_id).is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(vars(&[
            ("DUEL_SERVER_URL", "wss://duel.example.com/ws"),
            ("DUEL_PLAYER_ID", "user_42"),
            ("DUEL_PLAYER_NAME", "Ada"),
            ("DUEL_MATCH_SECONDS", "600"),
            ("DUEL_RECONNECT_ATTEMPTS", "2"),
            ("DUEL_RECONNECT_DELAY_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.identity(), Player::new("user_42", "Ada"));
        assert_eq!(config.session().match_seconds, 600);
        assert_eq!(config.connection().reconnect.max_attempts, 2);
        assert_eq!(config.reconnect_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_number() {
        let err = ClientConfig::from_lookup(vars(&[("DUEL_MATCH_SECONDS", "ten")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber { var: "DUEL_MATCH_SECONDS", value: "ten".to_string() }
        );
    }

    #[test]
    fn test_invalid_url() {
        let err = ClientConfig::from_lookup(vars(&[("DUEL_SERVER_URL", "http://localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_blank_name_falls_back() {
        let config = ClientConfig::from_lookup(vars(&[("DUEL_PLAYER_NAME", "  ")])).unwrap();
        assert_eq!(config.player_name, "player");
    }
}
