// ABOUTME: Store error types with SNAFU pattern.
// ABOUTME: Covers file access, log encoding, rejected stale writes, and lock timeouts.

use snafu::Snafu;
use std::path::PathBuf;

use crate::types::ChannelId;

/// Errors raised by deploy store implementations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("failed to access {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("corrupt deploy log for channel {channel}: {source}"))]
    Corrupt {
        channel: ChannelId,
        source: serde_json::Error,
    },

    #[snafu(display("failed to encode deploy log for channel {channel}: {source}"))]
    Encode {
        channel: ChannelId,
        source: serde_json::Error,
    },

    #[snafu(display(
        "rejected write to channel {channel}: deploy by {holder} is still in progress"
    ))]
    StaleWrite { channel: ChannelId, holder: String },

    #[snafu(display("timed out waiting for the lock on channel {channel} held by {holder}"))]
    LockTimeout { channel: ChannelId, holder: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Reading or writing the backing storage failed.
    Io,
    /// Stored data could not be decoded or encoded.
    Corrupt,
    /// A write would have replaced or buried an in-progress record.
    StaleWrite,
    /// Another process held the channel lock for too long.
    Locked,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Io { .. } => StoreErrorKind::Io,
            StoreError::Corrupt { .. } | StoreError::Encode { .. } => StoreErrorKind::Corrupt,
            StoreError::StaleWrite { .. } => StoreErrorKind::StaleWrite,
            StoreError::LockTimeout { .. } => StoreErrorKind::Locked,
        }
    }
}
