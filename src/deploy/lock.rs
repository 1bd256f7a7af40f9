// ABOUTME: Per-channel async locks serializing tracker read-modify-write spans.
// ABOUTME: Entries are created on demand and dropped once no caller holds or awaits them.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::types::ChannelId;

/// Registry of per-channel locks.
///
/// Different channels never wait on each other; the registry mutex is only
/// held for the map lookup, never across an await.
#[derive(Debug, Default)]
pub struct ChannelLocks {
    locks: Mutex<HashMap<ChannelId, Arc<AsyncMutex<()>>>>,
}

impl ChannelLocks {
    /// Wait for exclusive access to `channel`.
    pub async fn acquire(&self, channel: &ChannelId) -> ChannelGuard<'_> {
        let lock = self
            .locks
            .lock()
            .entry(channel.clone())
            .or_default()
            .clone();

        let guard = lock.lock_owned().await;
        ChannelGuard {
            locks: self,
            channel: channel.clone(),
            _guard: guard,
        }
    }

    /// Number of channels with a live lock entry.
    pub fn active(&self) -> usize {
        self.locks.lock().len()
    }
}

/// Exclusive access to one channel; released on drop.
#[must_use = "the channel is unlocked as soon as the guard is dropped"]
pub struct ChannelGuard<'a> {
    locks: &'a ChannelLocks,
    channel: ChannelId,
    _guard: OwnedMutexGuard<()>,
}

impl std::fmt::Debug for ChannelGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelGuard")
            .field("channel", &self.channel)
            .finish()
    }
}

impl Drop for ChannelGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.locks.lock();
        // One reference from the map, one from our guard; more means waiters.
        if let Some(lock) = locks.get(&self.channel)
            && Arc::strong_count(lock) <= 2
        {
            locks.remove(&self.channel);
        }
    }
}
