// ABOUTME: In-memory channel deploy log shared by the store backends.
// ABOUTME: Implements the upsert rule and the chronological history queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deploy::Deploy;
use crate::types::ChannelId;

use super::StoreError;
use super::error::StaleWriteSnafu;

/// Append-ordered deploy history of one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelLog {
    records: Vec<Deploy>,
}

impl ChannelLog {
    pub fn latest(&self) -> Option<&Deploy> {
        self.records.last()
    }

    pub fn records(&self) -> &[Deploy] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records started at or after `since`, oldest first.
    pub fn since(&self, since: DateTime<Utc>) -> Vec<Deploy> {
        self.records
            .iter()
            .filter(|deploy| deploy.started_at() >= since)
            .cloned()
            .collect()
    }

    /// Replace the in-progress latest record or append a new one.
    pub fn upsert(&mut self, channel: &ChannelId, deploy: &Deploy) -> Result<(), StoreError> {
        match self.records.last_mut() {
            Some(latest) if latest.is_in_progress() => {
                if latest.started_at() == deploy.started_at()
                    && latest.user().same_as(deploy.user())
                {
                    *latest = deploy.clone();
                    Ok(())
                } else {
                    tracing::warn!(
                        "Rejecting write to {}: {} is still deploying {}",
                        channel,
                        latest.user(),
                        latest.subject()
                    );
                    StaleWriteSnafu {
                        channel: channel.clone(),
                        holder: latest.user().name.clone(),
                    }
                    .fail()
                }
            }
            _ => {
                self.records.push(deploy.clone());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::PendingDeploy;
    use crate::store::StoreErrorKind;
    use crate::types::User;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 8, 4, 9, minute, 0).unwrap()
    }

    fn channel() -> ChannelId {
        ChannelId::new("ops").unwrap()
    }

    fn started(user: &str, minute: u32) -> Deploy {
        PendingDeploy::new(User::new(user, user), "api").start_at(at(minute))
    }

    #[test]
    fn appends_after_terminal_record() {
        let mut log = ChannelLog::default();
        let mut first = started("U1", 1);
        log.upsert(&channel(), &first).unwrap();
        first.finish_at(at(2)).unwrap();
        log.upsert(&channel(), &first).unwrap();

        let second = started("U2", 3);
        log.upsert(&channel(), &second).unwrap();

        assert_eq!(log.len(), 2);
        assert_eq!(log.latest(), Some(&second));
        assert_eq!(log.records()[0].finished_at(), Some(at(2)));
    }

    #[test]
    fn replaces_matching_in_progress_record() {
        let mut log = ChannelLog::default();
        let mut deploy = started("U1", 1);
        log.upsert(&channel(), &deploy).unwrap();

        deploy.abort_at("", at(5)).unwrap();
        log.upsert(&channel(), &deploy).unwrap();

        assert_eq!(log.len(), 1);
        assert!(log.latest().unwrap().is_aborted());
    }

    #[test]
    fn rejects_append_over_in_progress_record() {
        let mut log = ChannelLog::default();
        log.upsert(&channel(), &started("U1", 1)).unwrap();

        let err = log.upsert(&channel(), &started("U2", 2)).unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::StaleWrite);
        assert_eq!(log.len(), 1);
        assert_eq!(log.latest().unwrap().user().id, "U1");
    }

    #[test]
    fn since_is_inclusive() {
        let mut log = ChannelLog::default();
        for minute in [1, 5, 9] {
            let mut deploy = started("U1", minute);
            deploy.finish_at(at(minute + 1)).unwrap();
            log.upsert(&channel(), &deploy).unwrap();
        }

        let tail = log.since(at(5));
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].started_at(), at(5));
        assert!(log.since(at(10)).is_empty());
        assert_eq!(log.since(at(0)).len(), 3);
    }
}
