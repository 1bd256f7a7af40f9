// ABOUTME: Persistence contracts for deploy logs.
// ABOUTME: Store is the tracker's read/write path, Repository the history read path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::deploy::Deploy;
use crate::types::ChannelId;

use super::StoreError;
use super::lock_file::LockFile;

/// Latest-record access used by the deploy tracker.
#[async_trait]
pub trait Store: Send + Sync {
    /// The most recently started deploy in the channel, if any.
    async fn get(&self, channel: &ChannelId) -> Result<Option<Deploy>, StoreError>;

    /// Upsert `deploy` as the channel's most recent record.
    ///
    /// A record that matches the in-progress latest record (same start time
    /// and user) replaces it; anything else is appended. Appending while the
    /// latest record is still in progress fails with
    /// [`StoreError::StaleWrite`].
    async fn set(&self, channel: &ChannelId, deploy: &Deploy) -> Result<(), StoreError>;

    /// Exclusive access to the channel for a get-then-set span.
    ///
    /// Backends shared between processes override this; the default relies
    /// on the caller's in-process locking alone. Not reentrant.
    async fn lock(&self, _channel: &ChannelId) -> Result<StoreLock, StoreError> {
        Ok(StoreLock::unlocked())
    }
}

/// A held store-level channel lock, released on drop.
#[derive(Debug)]
#[must_use = "the channel is unlocked as soon as the lock is dropped"]
pub struct StoreLock {
    _file: Option<LockFile>,
}

impl StoreLock {
    pub fn unlocked() -> Self {
        Self { _file: None }
    }

    pub(crate) fn file(file: LockFile) -> Self {
        Self { _file: Some(file) }
    }
}

/// Ordered history access used by the dashboard.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Full history of the channel, oldest first.
    async fn all(&self, channel: &ChannelId) -> Result<Vec<Deploy>, StoreError>;

    /// Deploys started at or after `since`, oldest first.
    async fn since(
        &self,
        channel: &ChannelId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Deploy>, StoreError>;
}

/// A backend serving both the tracker and the dashboard from one log.
pub trait Backend: Store + Repository {}

impl<T: Store + Repository> Backend for T {}

#[async_trait]
impl<T: Store + ?Sized> Store for Arc<T> {
    async fn get(&self, channel: &ChannelId) -> Result<Option<Deploy>, StoreError> {
        (**self).get(channel).await
    }

    async fn set(&self, channel: &ChannelId, deploy: &Deploy) -> Result<(), StoreError> {
        (**self).set(channel, deploy).await
    }

    async fn lock(&self, channel: &ChannelId) -> Result<StoreLock, StoreError> {
        (**self).lock(channel).await
    }
}

#[async_trait]
impl<T: Repository + ?Sized> Repository for Arc<T> {
    async fn all(&self, channel: &ChannelId) -> Result<Vec<Deploy>, StoreError> {
        (**self).all(channel).await
    }

    async fn since(
        &self,
        channel: &ChannelId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Deploy>, StoreError> {
        (**self).since(channel, since).await
    }
}
