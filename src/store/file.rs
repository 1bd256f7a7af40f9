// ABOUTME: JSON file deploy store, one file per channel under a state directory.
// ABOUTME: Writes go through a unique temp file renamed into place; channel lock files span processes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use snafu::ResultExt;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::deploy::Deploy;
use crate::types::ChannelId;

use super::error::{CorruptSnafu, EncodeSnafu, IoSnafu};
use super::lock_file::LockFile;
use super::log::ChannelLog;
use super::{Repository, Store, StoreError, StoreLock};

/// Deploy logs persisted as `<dir>/<channel>.json`.
///
/// Writers within one process are serialized by `set`. Across processes,
/// callers hold [`Store::lock`] (a `<dir>/<channel>.lock` file) around each
/// get-then-set span, as the tracker does.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    write: Mutex<()>,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .context(IoSnafu { path: &dir })?;
        tracing::debug!("Opened deploy store at {}", dir.display());
        Ok(Self {
            dir,
            write: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the log file for a channel.
    pub fn log_path(&self, channel: &ChannelId) -> PathBuf {
        self.dir.join(format!("{}.json", channel))
    }

    async fn load(&self, channel: &ChannelId) -> Result<ChannelLog, StoreError> {
        let path = self.log_path(channel);
        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ChannelLog::default()),
            Err(e) => return Err(e).context(IoSnafu { path }),
        };

        serde_json::from_slice(&content).context(CorruptSnafu {
            channel: channel.clone(),
        })
    }

    async fn save(&self, channel: &ChannelId, log: &ChannelLog) -> Result<(), StoreError> {
        let content = serde_json::to_vec_pretty(log).context(EncodeSnafu {
            channel: channel.clone(),
        })?;

        let dir = self.dir.clone();
        let path = self.log_path(channel);
        tokio::task::spawn_blocking({
            let path = path.clone();
            move || -> io::Result<()> {
                let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
                tmp.write_all(&content)?;
                tmp.as_file().sync_all()?;
                tmp.persist(&path).map_err(|e| e.error)?;
                Ok(())
            }
        })
        .await
        .map_err(io::Error::other)
        .and_then(|written| written)
        .context(IoSnafu { path })
    }
}

#[async_trait]
impl Store for FileStore {
    async fn get(&self, channel: &ChannelId) -> Result<Option<Deploy>, StoreError> {
        Ok(self.load(channel).await?.latest().cloned())
    }

    async fn set(&self, channel: &ChannelId, deploy: &Deploy) -> Result<(), StoreError> {
        let _write = self.write.lock().await;
        let mut log = self.load(channel).await?;
        log.upsert(channel, deploy)?;
        self.save(channel, &log).await
    }

    async fn lock(&self, channel: &ChannelId) -> Result<StoreLock, StoreError> {
        Ok(StoreLock::file(LockFile::acquire(&self.dir, channel).await?))
    }
}

#[async_trait]
impl Repository for FileStore {
    async fn all(&self, channel: &ChannelId) -> Result<Vec<Deploy>, StoreError> {
        Ok(self.load(channel).await?.records().to_vec())
    }

    async fn since(
        &self,
        channel: &ChannelId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Deploy>, StoreError> {
        Ok(self.load(channel).await?.since(since))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::PendingDeploy;
    use crate::store::StoreErrorKind;
    use crate::types::User;

    #[tokio::test]
    async fn open_creates_directory() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("nested").join("state");

        let store = FileStore::open(&dir).await.unwrap();
        assert!(store.dir().is_dir());
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let channel = ChannelId::new("ops").unwrap();

        let mut deploy = PendingDeploy::new(User::new("U1", "alice"), "api").start();
        {
            let store = FileStore::open(temp.path()).await.unwrap();
            store.set(&channel, &deploy).await.unwrap();
            deploy.abort("rolled back").unwrap();
            store.set(&channel, &deploy).await.unwrap();
        }

        let store = FileStore::open(temp.path()).await.unwrap();
        let history = store.all(&channel).await.unwrap();
        assert_eq!(history, vec![deploy.clone()]);
        assert_eq!(store.get(&channel).await.unwrap(), Some(deploy));
        assert!(store.log_path(&channel).is_file());
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileStore::open(temp.path()).await.unwrap();
        let channel = ChannelId::new("quiet").unwrap();

        assert!(store.get(&channel).await.unwrap().is_none());
        assert!(store.all(&channel).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileStore::open(temp.path()).await.unwrap();
        let channel = ChannelId::new("broken").unwrap();
        std::fs::write(store.log_path(&channel), "{not json").unwrap();

        let err = store.get(&channel).await.unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::Corrupt);
        assert!(err.to_string().contains("broken"));
    }
}
