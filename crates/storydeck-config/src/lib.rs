use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use storydeck_engine::SyncTiming;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub deck_path: PathBuf,
    /// Quiescence window after the last text edit, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_debounce_ms: Option<u64>,
    /// Quiescence window after the last cursor move, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_debounce_ms: Option<u64>,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded deck path
        config.deck_path = Self::expand_path(&config.deck_path).unwrap_or(config.deck_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/storydeck");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Engine timing with any configured overrides applied over the defaults.
    pub fn sync_timing(&self) -> SyncTiming {
        let defaults = SyncTiming::default();
        SyncTiming {
            edit_quiesce: self
                .edit_debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.edit_quiesce),
            cursor_quiesce: self
                .cursor_debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.cursor_quiesce),
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
