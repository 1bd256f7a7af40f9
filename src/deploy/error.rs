// ABOUTME: Error types for deploy tracking operations.
// ABOUTME: Conflicts and no-ops are return values; only real failures live here.

use chrono::{DateTime, Utc};

use crate::store::StoreError;

use super::record::DeployState;

/// Errors from deploy record transitions and tracker operations.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// A finish or abort was attempted on a record that already ended.
    #[error("deploy already {state} at {finished_at}")]
    AlreadyTerminal {
        state: DeployState,
        finished_at: DateTime<Utc>,
    },

    /// The backing store failed to read or persist a record.
    #[error("deploy store error: {0}")]
    Store(#[from] StoreError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    AlreadyTerminal,
    Store,
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::AlreadyTerminal { .. } => DeployErrorKind::AlreadyTerminal,
            DeployError::Store(_) => DeployErrorKind::Store,
        }
    }
}
