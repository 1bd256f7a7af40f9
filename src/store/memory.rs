// ABOUTME: In-memory deploy store for tests and ephemeral servers.
// ABOUTME: Store and Repository are two views of the same per-channel log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::deploy::Deploy;
use crate::types::ChannelId;

use super::log::ChannelLog;
use super::{Repository, Store, StoreError};

/// Deploy logs kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    channels: RwLock<HashMap<ChannelId, ChannelLog>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a channel's log.
    pub fn log(&self, channel: &ChannelId) -> ChannelLog {
        self.channels
            .read()
            .get(channel)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, channel: &ChannelId) -> Result<Option<Deploy>, StoreError> {
        Ok(self
            .channels
            .read()
            .get(channel)
            .and_then(|log| log.latest().cloned()))
    }

    async fn set(&self, channel: &ChannelId, deploy: &Deploy) -> Result<(), StoreError> {
        self.channels
            .write()
            .entry(channel.clone())
            .or_default()
            .upsert(channel, deploy)
    }
}

#[async_trait]
impl Repository for MemoryStore {
    async fn all(&self, channel: &ChannelId) -> Result<Vec<Deploy>, StoreError> {
        Ok(self.log(channel).records().to_vec())
    }

    async fn since(
        &self,
        channel: &ChannelId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Deploy>, StoreError> {
        Ok(self
            .channels
            .read()
            .get(channel)
            .map(|log| log.since(since))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::PendingDeploy;
    use crate::types::User;

    #[tokio::test]
    async fn unknown_channel_is_empty() {
        let store = MemoryStore::new();
        let channel = ChannelId::new("nobody").unwrap();

        assert!(store.get(&channel).await.unwrap().is_none());
        assert!(store.all(&channel).await.unwrap().is_empty());
        assert!(store.since(&channel, Utc::now()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = MemoryStore::new();
        let channel = ChannelId::new("ops").unwrap();
        let deploy = PendingDeploy::new(User::new("U1", "alice"), "api v2").start();

        store.set(&channel, &deploy).await.unwrap();

        let read = store.get(&channel).await.unwrap().unwrap();
        assert_eq!(read, deploy);
        assert_eq!(read.user().name, "alice");
        assert_eq!(store.all(&channel).await.unwrap(), vec![deploy]);
    }

    #[tokio::test]
    async fn channels_are_independent() {
        let store = MemoryStore::new();
        let ops = ChannelId::new("ops").unwrap();
        let web = ChannelId::new("web").unwrap();

        let deploy = PendingDeploy::new(User::new("U1", "alice"), "api").start();
        store.set(&ops, &deploy).await.unwrap();

        assert!(store.get(&web).await.unwrap().is_none());
        assert_eq!(store.log(&ops).len(), 1);
    }
}
