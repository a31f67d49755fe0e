use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:9943/api";
pub const API_BASE_ENV: &str = "NAMEBOARD_API_BASE";
pub const DATA_DIR_ENV: &str = "NAMEBOARD_DATA_DIR";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base: String,
    /// Directory for the durable identity store.
    pub data_dir: PathBuf,
    /// Keep identity in memory only; nothing is written under `data_dir`.
    pub ephemeral: bool,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            data_dir: PathBuf::from(".nameboard"),
            ephemeral: false,
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    /// Environment overrides sit between the config file and command line flags.
    pub fn apply_env(mut self) -> Self {
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                self.api_base = base;
            }
        }
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.data_dir = PathBuf::from(dir);
            }
        }
        self
    }

    /// Location of the sled identity tree, or `None` for an in-memory store.
    pub fn identity_path(&self) -> Option<PathBuf> {
        if self.ephemeral {
            None
        } else {
            Some(self.data_dir.join("identity"))
        }
    }
}
