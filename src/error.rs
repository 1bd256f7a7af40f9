// ABOUTME: Application-wide error types for deploylog.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::deploy::DeployError;
use crate::store::StoreError;
use crate::types::ChannelIdError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("cannot determine state directory: set state_dir, XDG_STATE_HOME, or HOME")]
    NoStateDir,

    #[error("invalid channel: {0}")]
    InvalidChannel(#[from] ChannelIdError),

    #[error("invalid time {0:?}: expected RFC 3339, e.g. 2016-08-04T09:28:00Z")]
    InvalidTime(String),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
