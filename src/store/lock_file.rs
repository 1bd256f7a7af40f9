// ABOUTME: Cross-process channel lock for the file store.
// ABOUTME: Atomic create-if-absent lock file holding holder, pid, and acquisition time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::types::ChannelId;

use super::StoreError;
use super::error::{EncodeSnafu, IoSnafu, LockTimeoutSnafu};

/// Seconds after which a lock belongs to a crashed process and is broken.
const STALE_AFTER_SECS: i64 = 60;

/// Pause between acquisition attempts while another process holds the lock.
const RETRY_INTERVAL: Duration = Duration::from_millis(20);

/// Give up waiting for a held lock after this long.
const WAIT_LIMIT: Duration = Duration::from_secs(10);

/// Who holds a channel lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    pub pid: u32,
    pub acquired_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process.
    pub fn current() -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            acquired_at: Utc::now(),
        }
    }

    pub fn is_stale(&self) -> bool {
        (Utc::now() - self.acquired_at).num_seconds() >= STALE_AFTER_SECS
    }
}

/// A held channel lock file, removed on drop.
#[derive(Debug)]
pub struct LockFile {
    path: PathBuf,
}

impl LockFile {
    /// Wait until `<dir>/<channel>.lock` can be created, then hold it.
    pub async fn acquire(dir: &Path, channel: &ChannelId) -> Result<Self, StoreError> {
        let path = lock_path(dir, channel);
        let content = serde_json::to_vec(&LockInfo::current()).context(EncodeSnafu {
            channel: channel.clone(),
        })?;
        let deadline = tokio::time::Instant::now() + WAIT_LIMIT;

        loop {
            let created = try_create(dir.to_path_buf(), path.clone(), content.clone())
                .await
                .context(IoSnafu { path: &path })?;
            if created {
                tracing::debug!("Locked {}", path.display());
                return Ok(Self { path });
            }

            let existing = read_state(&path).await;
            match &existing {
                LockState::Held(info) if !info.is_stale() => {}
                LockState::Held(info) => {
                    tracing::warn!(
                        "Breaking stale lock on {} held by {} (pid {}) since {}",
                        channel,
                        info.holder,
                        info.pid,
                        info.acquired_at
                    );
                    remove_if_unchanged(&path, &existing).await;
                    continue;
                }
                LockState::Corrupt => {
                    tracing::warn!("Lock info for {} corrupted, breaking lock", channel);
                    remove_if_unchanged(&path, &existing).await;
                    continue;
                }
                // Released between our attempt and the read.
                LockState::Released => continue,
            }

            if tokio::time::Instant::now() >= deadline {
                let holder = match existing {
                    LockState::Held(info) => format!("{} (pid {})", info.holder, info.pid),
                    _ => "another process".to_string(),
                };
                return LockTimeoutSnafu {
                    channel: channel.clone(),
                    holder,
                }
                .fail();
            }
            tokio::time::sleep(RETRY_INTERVAL).await;
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}

pub fn lock_path(dir: &Path, channel: &ChannelId) -> PathBuf {
    dir.join(format!("{}.lock", channel))
}

/// What an existing lock file says about its holder.
#[derive(Debug, PartialEq, Eq)]
enum LockState {
    Held(LockInfo),
    Corrupt,
    Released,
}

/// Publish `content` at `path` unless it already exists.
///
/// The content is written to a private temp file first and hard-linked into
/// place, so a visible lock file is always complete.
async fn try_create(dir: PathBuf, path: PathBuf, content: Vec<u8>) -> io::Result<bool> {
    tokio::task::spawn_blocking(move || {
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&content)?;
        tmp.flush()?;

        match std::fs::hard_link(tmp.path(), &path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e),
        }
    })
    .await
    .map_err(io::Error::other)?
}

async fn read_state(path: &Path) -> LockState {
    match tokio::fs::read(path).await {
        Ok(content) => serde_json::from_slice(&content)
            .map(LockState::Held)
            .unwrap_or(LockState::Corrupt),
        Err(e) if e.kind() == ErrorKind::NotFound => LockState::Released,
        Err(_) => LockState::Corrupt,
    }
}

/// Remove a lock we decided to break, unless someone replaced it meanwhile.
async fn remove_if_unchanged(path: &Path, seen: &LockState) {
    if read_state(path).await == *seen
        && let Err(e) = tokio::fs::remove_file(path).await
        && e.kind() != ErrorKind::NotFound
    {
        tracing::warn!("Failed to break lock {}: {}", path.display(), e);
    }
}
