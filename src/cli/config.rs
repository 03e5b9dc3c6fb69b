//! Arguments shared by every command that touches the model directory

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use crate::app::{DEFAULT_CONFIG_FILE, EngineConfig};

/// Engine selection flags; command-line values override the config file
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// JSON engine configuration file [default: ./tictactoe-td.json if present]
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Directory holding q_table_<id>.csv files
    #[arg(long)]
    pub model_dir: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,
}

impl EngineArgs {
    /// Resolve the effective engine configuration.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => EngineConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE))
                .with_context(|| format!("Failed to load config {DEFAULT_CONFIG_FILE}"))?,
        };

        if let Some(dir) = &self.model_dir {
            config = config.with_model_dir(dir.clone());
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config.validate()?;
        Ok(config)
    }
}
