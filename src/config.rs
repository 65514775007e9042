use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Limits of one blind phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlindConfig {
    /// Moves a player submits in the blind phase.
    pub max_moves: u8,
    /// Moves any single piece may make within those.
    pub max_per_piece: u8,
}
impl Default for BlindConfig {
    fn default() -> Self {
        BlindConfig {
            max_moves: 5,
            max_per_piece: 2,
        }
    }
}
impl BlindConfig {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.max_moves == 0 {
            return Err(ConfigError::ZeroLimit("max_moves"));
        }
        if self.max_per_piece == 0 {
            return Err(ConfigError::ZeroLimit("max_per_piece"));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionTiming {
    /// How long further drops are ignored after an accepted one.
    pub drop_guard_ms: u64,
    /// How long submit stays disabled after an attempt, whatever its outcome.
    pub submit_cooldown_ms: u64,
}
impl Default for SessionTiming {
    fn default() -> Self {
        SessionTiming {
            drop_guard_ms: 100,
            submit_cooldown_ms: 2000,
        }
    }
}
impl SessionTiming {
    pub fn drop_guard(self) -> Duration {
        Duration::from_millis(self.drop_guard_ms)
    }
    pub fn submit_cooldown(self) -> Duration {
        Duration::from_millis(self.submit_cooldown_ms)
    }
}

/// Everything a session can be configured with, as read from a TOML file:
///
/// ```toml
/// [limits]
/// max_moves = 5
/// max_per_piece = 2
///
/// [timing]
/// drop_guard_ms = 100
/// submit_cooldown_ms = 2000
/// ```
///
/// Missing tables and keys fall back to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub limits: BlindConfig,
    pub timing: SessionTiming,
}
impl Settings {
    pub fn from_toml(src: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(src)?;
        settings.limits.validate()?;
        Ok(settings)
    }
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path)?;
        let settings = Self::from_toml(&src)?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }
}
#[cfg(test)]
mod test {
    use crate::{
        config::{BlindConfig, SessionTiming, Settings},
        error::ConfigError,
    };

    #[test]
    fn defaults_match_the_standard_blind_phase() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.limits.max_moves, 5);
        assert_eq!(settings.limits.max_per_piece, 2);
        assert_eq!(settings.timing.submit_cooldown().as_secs(), 2);
    }
    #[test]
    fn partial_tables_keep_other_defaults() {
        let settings = Settings::from_toml("[limits]\nmax_moves = 3\n").unwrap();
        assert_eq!(
            settings.limits,
            BlindConfig {
                max_moves: 3,
                max_per_piece: 2
            }
        );
        assert_eq!(settings.timing, SessionTiming::default());
    }
    #[test]
    fn rejects_zero_limits_and_unknown_keys() {
        assert!(matches!(
            Settings::from_toml("[limits]\nmax_per_piece = 0\n"),
            Err(ConfigError::ZeroLimit("max_per_piece"))
        ));
        assert!(matches!(
            Settings::from_toml("[limits]\nmax_movez = 3\n"),
            Err(ConfigError::Toml(_))
        ));
    }
}
