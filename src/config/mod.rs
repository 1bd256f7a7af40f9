// ABOUTME: Configuration types and parsing for deploylog.yml.
// ABOUTME: Handles discovery, defaults, and state directory resolution.

mod deserialize;
mod init;

pub use deserialize::parse_offset;
pub use init::init_config;

use crate::error::{Error, Result};
use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "deploylog.yml";
pub const CONFIG_FILENAME_ALT: &str = "deploylog.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".deploylog/config.yml";

/// State directory relative to $HOME when XDG_STATE_HOME is unset.
const HOME_STATE_DIR: &str = ".local/state/deploylog";

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8081";

/// Which store backend holds the deploy logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// JSON files under the state directory.
    #[default]
    File,
    /// Process memory; history is lost on exit.
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    #[serde(default)]
    pub state_dir: Option<PathBuf>,

    #[serde(default)]
    pub store: StoreKind,

    #[serde(
        default = "default_display_offset",
        deserialize_with = "deserialize::deserialize_offset"
    )]
    pub display_offset: FixedOffset,
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8081))
}

fn default_display_offset() -> FixedOffset {
    Utc.fix()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen: default_listen(),
            state_dir: None,
            store: StoreKind::default(),
            display_offset: default_display_offset(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file means "all defaults".
        if yaml.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Like [`Config::discover`], falling back to defaults when no file exists.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => {
                tracing::debug!("No config in {}, using defaults", dir.display());
                Ok(Config::default())
            }
            other => other,
        }
    }

    /// Directory holding the file store's channel logs.
    pub fn resolve_state_dir(&self) -> Result<PathBuf> {
        match &self.state_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_state_dir(),
        }
    }
}

/// `$XDG_STATE_HOME/deploylog`, else `$HOME/.local/state/deploylog`.
pub fn default_state_dir() -> Result<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_STATE_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg).join("deploylog"));
    }
    match std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        Some(home) => Ok(PathBuf::from(home).join(HOME_STATE_DIR)),
        None => Err(Error::NoStateDir),
    }
}
