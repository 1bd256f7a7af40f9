// ABOUTME: Command module aggregator for the deploylog CLI.
// ABOUTME: Opens the configured backend and re-exports command handlers.

mod history;
mod serve;
mod track;

pub use history::history;
pub use serve::serve;
pub use track::{abort, finish, start, status};

use deploylog::config::{Config, StoreKind};
use deploylog::deploy::ChannelDeploys;
use deploylog::error::Result;
use deploylog::store::{Backend, FileStore, MemoryStore};
use std::process::ExitCode;
use std::sync::Arc;

/// Tracker over whichever backend the config selects.
pub type Tracker = ChannelDeploys<Arc<dyn Backend>>;

/// How a command ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Done,
    /// The tracker declined: conflicting deploy or nothing in progress.
    Refused,
}

impl Completion {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Completion::Done => ExitCode::SUCCESS,
            Completion::Refused => ExitCode::from(2),
        }
    }
}

/// Open the store backend selected by `config`.
pub async fn open_backend(config: &Config) -> Result<Arc<dyn Backend>> {
    match config.store {
        StoreKind::File => {
            let dir = config.resolve_state_dir()?;
            Ok(Arc::new(FileStore::open(dir).await?))
        }
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store; deploy history is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub async fn open_tracker(config: &Config) -> Result<Tracker> {
    Ok(ChannelDeploys::new(open_backend(config).await?))
}
