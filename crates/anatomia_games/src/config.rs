//! Game timing configuration
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! [challenge]
//! reveal_delay_ms = 2000
//!
//! [dictation]
//! total_rounds = 10
//! advance_delay_ms = 1500
//! focus_delay_ms = 100
//! ```

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Challenge mode settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    /// How long the correct answer stays revealed after a wrong click
    pub reveal_delay_ms: u64,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            reveal_delay_ms: 2000,
        }
    }
}

impl ChallengeConfig {
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

/// Dictation mode settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictationConfig {
    /// Rounds per session, clamped to the catalog size at start
    pub total_rounds: u32,
    /// Pause between a submission and the next round
    pub advance_delay_ms: u64,
    /// Delay before the input field is focused after start
    pub focus_delay_ms: u64,
}

impl Default for DictationConfig {
    fn default() -> Self {
        Self {
            total_rounds: 10,
            advance_delay_ms: 1500,
            focus_delay_ms: 100,
        }
    }
}

impl DictationConfig {
    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }

    pub fn focus_delay(&self) -> Duration {
        Duration::from_millis(self.focus_delay_ms)
    }
}

/// Settings for both game modes
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub challenge: ChallengeConfig,
    pub dictation: DictationConfig,
}

impl GameConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!("GameConfig: loaded {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dictation.total_rounds == 0 {
            return Err(ConfigError::Invalid {
                key: "dictation.total_rounds",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.challenge.reveal_delay(), Duration::from_secs(2));
        assert_eq!(config.dictation.total_rounds, 10);
        assert_eq!(config.dictation.advance_delay(), Duration::from_millis(1500));
        assert_eq!(config.dictation.focus_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = GameConfig::from_toml_str("[dictation]\ntotal_rounds = 5\n").unwrap();
        assert_eq!(config.dictation.total_rounds, 5);
        assert_eq!(config.dictation.advance_delay_ms, 1500);
        assert_eq!(config.challenge, ChallengeConfig::default());

        assert_eq!(GameConfig::from_toml_str("").unwrap(), GameConfig::default());
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let err = GameConfig::from_toml_str("[dictation]\ntotal_rounds = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "dictation.total_rounds",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let err = GameConfig::from_toml_str("[challenge\nreveal_delay_ms = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = GameConfig::load("/nonexistent/anatomia/games.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
