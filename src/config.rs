use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::parser::ParseOptions;
use crate::tally::DEFAULT_MAX_INPUT_BYTES;

const CONFIG_DIR_NAME: &str = "doubles-tally";
const CONFIG_FILE_NAME: &str = "settings.toml";

/// When the interactive editor recounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerMode {
    /// Only on an explicit count key
    #[default]
    Manual,
    /// After every edit, showing partial results
    Live,
}

/// How results are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Application configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Recount behaviour of the interactive editor
    pub trigger_mode: TriggerMode,
    /// Inputs above this size are rejected
    pub max_input_bytes: usize,
    /// Output format for results and errors
    pub output: OutputFormat,
    /// Game line parsing rules
    pub parse: ParseOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trigger_mode: TriggerMode::default(),
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            output: OutputFormat::default(),
            parse: ParseOptions::default(),
        }
    }
}

impl Config {
    /// Get the default config file path, if the platform has a config directory
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Pick an explicit path, or fall back to the default location
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(Self::default_config_path)
    }

    /// Load from a located path; with no path at all, run on defaults
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_or_default(p),
            None => {
                debug!("no config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load config from file, or use defaults if it doesn't exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to the given location, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let toml_string = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        info!(path = %path.display(), "saved configuration");
        Ok(())
    }
}
