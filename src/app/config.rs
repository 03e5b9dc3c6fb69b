//! Engine configuration loaded from JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    pipeline::{MatchConfig, TrainingConfig},
};

/// Directory model tables are stored in unless configured otherwise
pub const DEFAULT_MODEL_DIR: &str = "models";

/// Config file picked up from the working directory when none is named
pub const DEFAULT_CONFIG_FILE: &str = "tictactoe-td.json";

/// Configuration for the whole engine.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
///
/// # Examples
///
/// ```
/// use tictactoe_td::app::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_model_dir("/tmp/models")
///     .with_seed(42)
///     .with_episodes(1_000);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.training.seed, Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding `q_table_<id>.csv` files
    pub model_dir: PathBuf,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
    /// Self-play training settings
    pub training: TrainingConfig,
    /// Interactive play settings
    pub play: MatchConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            seed: None,
            training: TrainingConfig::default(),
            play: MatchConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file.
    ///
    /// A top-level `seed` is copied into the training settings unless they
    /// carry their own.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON or
    /// fails [`EngineConfig::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read config file {}", path.display()),
            source,
        })?;
        let mut config: EngineConfig = serde_json::from_str(&content)?;
        if config.training.seed.is_none() {
            config.training.seed = config.seed;
        }
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file, falling back to defaults if the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("Config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.model_dir.as_os_str().is_empty() {
            return Err(Error::InvalidConfiguration {
                message: "model_dir must not be empty".to_string(),
            });
        }
        self.training.validate()?;
        self.play.validate()
    }

    /// Set the model directory.
    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self.training.seed = Some(seed);
        self
    }

    /// Set the number of self-play episodes.
    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.training.episodes = episodes;
        self
    }

    /// Enable or disable learning from interactive games.
    pub fn with_learning(mut self, enabled: bool) -> Self {
        self.play.learn_from_games = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.model_dir, PathBuf::from("models"));
        assert!(!config.play.learn_from_games);
        assert_eq!(config.play.max_losses, 7);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("engine.json");
        std::fs::write(
            &path,
            r#"{ "seed": 9, "training": { "episodes": 500 }, "play": { "learn_from_games": true } }"#,
        )
        .unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.training.episodes, 500);
        assert_eq!(config.training.first_mover_probability, 0.7);
        assert_eq!(config.training.seed, Some(9));
        assert!(config.play.learn_from_games);
        assert_eq!(config.play.switch_lookahead, 3);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("engine.json");
        std::fs::write(&path, r#"{ "play": { "epsilon": 2.0 } }"#).unwrap();

        assert!(matches!(
            EngineConfig::load(&path),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = EngineConfig::load_or_default(&temp_dir.path().join("absent.json")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_existing_file_is_loaded_instead_of_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, r#"{ "model_dir": "trained" }"#).unwrap();

        let config = EngineConfig::load_or_default(&path).unwrap();
        assert_eq!(config.model_dir, PathBuf::from("trained"));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("engine.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            EngineConfig::load(&path),
            Err(Error::Serialization(_))
        ));
    }
}
