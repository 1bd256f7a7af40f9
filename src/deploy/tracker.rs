// ABOUTME: Channel deploy tracker enforcing one in-progress deploy per channel.
// ABOUTME: Resolves start conflicts and persists every transition through a Store.

use crate::store::Store;
use crate::types::ChannelId;

use super::error::DeployError;
use super::lock::ChannelLocks;
use super::record::{Deploy, PendingDeploy};

/// Result of a start request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum StartOutcome {
    /// The deploy was started. `superseded` is the same user's previous
    /// deploy, finished implicitly to make room for this one.
    Started {
        deploy: Deploy,
        superseded: Option<Deploy>,
    },
    /// Another user's deploy is in progress; it is returned unchanged.
    Conflict { current: Deploy },
}

impl StartOutcome {
    pub fn started(&self) -> bool {
        matches!(self, StartOutcome::Started { .. })
    }

    /// The started deploy, or the conflicting one.
    pub fn deploy(&self) -> &Deploy {
        match self {
            StartOutcome::Started { deploy, .. } => deploy,
            StartOutcome::Conflict { current } => current,
        }
    }

    pub fn superseded(&self) -> Option<&Deploy> {
        match self {
            StartOutcome::Started { superseded, .. } => superseded.as_ref(),
            StartOutcome::Conflict { .. } => None,
        }
    }

    pub fn into_deploy(self) -> Deploy {
        match self {
            StartOutcome::Started { deploy, .. } => deploy,
            StartOutcome::Conflict { current } => current,
        }
    }
}

/// Tracks deploys per channel on top of a [`Store`].
///
/// Holds no deploy state of its own: every call re-reads the store while
/// holding the channel's lock, so concurrent callers on one channel are
/// serialized and callers on different channels proceed independently.
/// Mutating calls also hold the store's own channel lock, which is what
/// serializes trackers in different processes sharing a file store.
#[derive(Debug)]
pub struct ChannelDeploys<S> {
    store: S,
    locks: ChannelLocks,
}

impl<S: Store> ChannelDeploys<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: ChannelLocks::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The channel's in-progress deploy, if any.
    pub async fn current(&self, channel: &ChannelId) -> Result<Option<Deploy>, DeployError> {
        let _guard = self.locks.acquire(channel).await;
        self.current_locked(channel).await
    }

    /// Start `candidate` unless another user is already deploying.
    ///
    /// The same user's unfinished deploy is finished implicitly first.
    pub async fn start(
        &self,
        channel: &ChannelId,
        candidate: PendingDeploy,
    ) -> Result<StartOutcome, DeployError> {
        let _guard = self.locks.acquire(channel).await;
        let _store_lock = self.store.lock(channel).await?;

        let mut superseded = None;
        while let Some(mut current) = self.current_locked(channel).await? {
            if !current.user().same_as(candidate.user()) {
                tracing::warn!(
                    "{} cannot start {} in {}: {} is deploying {} since {}",
                    candidate.user(),
                    candidate.subject(),
                    channel,
                    current.user(),
                    current.subject(),
                    current.started_at()
                );
                return Ok(StartOutcome::Conflict { current });
            }

            tracing::debug!(
                "Implicitly finishing {} by {} in {}",
                current.subject(),
                current.user(),
                channel
            );
            current.finish()?;
            self.store.set(channel, &current).await?;
            superseded = Some(current);
        }

        let deploy = candidate.start();
        self.store.set(channel, &deploy).await?;
        tracing::info!(
            "{} started deploying {} in {}",
            deploy.user(),
            deploy.subject(),
            channel
        );

        Ok(StartOutcome::Started { deploy, superseded })
    }

    /// Finish the in-progress deploy. `None` when nothing is in progress.
    pub async fn finish(&self, channel: &ChannelId) -> Result<Option<Deploy>, DeployError> {
        let _guard = self.locks.acquire(channel).await;
        let _store_lock = self.store.lock(channel).await?;

        let Some(mut current) = self.current_locked(channel).await? else {
            tracing::debug!("Nothing to finish in {}", channel);
            return Ok(None);
        };

        current.finish()?;
        self.store.set(channel, &current).await?;
        tracing::info!(
            "{} finished deploying {} in {}",
            current.user(),
            current.subject(),
            channel
        );

        Ok(Some(current))
    }

    /// Abort the in-progress deploy. `None` when nothing is in progress.
    pub async fn abort(
        &self,
        channel: &ChannelId,
        reason: &str,
    ) -> Result<Option<Deploy>, DeployError> {
        let _guard = self.locks.acquire(channel).await;
        let _store_lock = self.store.lock(channel).await?;

        let Some(mut current) = self.current_locked(channel).await? else {
            tracing::debug!("Nothing to abort in {}", channel);
            return Ok(None);
        };

        current.abort(reason)?;
        self.store.set(channel, &current).await?;
        tracing::info!(
            "{} aborted deploying {} in {}",
            current.user(),
            current.subject(),
            channel
        );

        Ok(Some(current))
    }

    async fn current_locked(&self, channel: &ChannelId) -> Result<Option<Deploy>, DeployError> {
        Ok(self
            .store
            .get(channel)
            .await?
            .filter(Deploy::is_in_progress))
    }
}
