// ABOUTME: Deploy record entity and its lifecycle transitions.
// ABOUTME: PendingDeploy becomes a Deploy on start; finish/abort make it terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::User;

use super::error::DeployError;

/// A deploy request that has not been started yet.
///
/// Starting consumes the value, so a record can only ever be started once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeploy {
    user: User,
    subject: String,
}

impl PendingDeploy {
    pub fn new(user: User, subject: impl Into<String>) -> Self {
        Self {
            user,
            subject: subject.into(),
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Start the deploy now.
    pub fn start(self) -> Deploy {
        self.start_at(Utc::now())
    }

    /// Start the deploy at an explicit time.
    pub fn start_at(self, started_at: DateTime<Utc>) -> Deploy {
        Deploy {
            user: self.user,
            subject: self.subject,
            started_at,
            outcome: Outcome::InProgress,
        }
    }
}

/// How a deploy ended, if it has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Outcome {
    InProgress,
    Finished {
        finished_at: DateTime<Utc>,
    },
    Aborted {
        finished_at: DateTime<Utc>,
        #[serde(default)]
        reason: String,
    },
}

/// Coarse lifecycle state of a deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeployState {
    InProgress,
    Finished,
    Aborted,
}

impl fmt::Display for DeployState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeployState::InProgress => "in progress",
            DeployState::Finished => "finished",
            DeployState::Aborted => "aborted",
        })
    }
}

/// One started deploy of a subject in a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deploy {
    user: User,
    subject: String,
    started_at: DateTime<Utc>,
    #[serde(flatten)]
    outcome: Outcome,
}

impl Deploy {
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the deploy became terminal (None while in progress).
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        match &self.outcome {
            Outcome::InProgress => None,
            Outcome::Finished { finished_at } | Outcome::Aborted { finished_at, .. } => {
                Some(*finished_at)
            }
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self.outcome, Outcome::InProgress)
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.outcome, Outcome::Aborted { .. })
    }

    /// Abort reason; empty when aborted without one, None unless aborted.
    pub fn abort_reason(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Aborted { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn state(&self) -> DeployState {
        match self.outcome {
            Outcome::InProgress => DeployState::InProgress,
            Outcome::Finished { .. } => DeployState::Finished,
            Outcome::Aborted { .. } => DeployState::Aborted,
        }
    }

    /// Mark the deploy as finished now.
    pub fn finish(&mut self) -> Result<(), DeployError> {
        self.finish_at(Utc::now())
    }

    pub fn finish_at(&mut self, finished_at: DateTime<Utc>) -> Result<(), DeployError> {
        self.ensure_in_progress()?;
        self.outcome = Outcome::Finished { finished_at };
        Ok(())
    }

    /// Mark the deploy as aborted now. An empty reason is allowed.
    pub fn abort(&mut self, reason: impl Into<String>) -> Result<(), DeployError> {
        self.abort_at(reason, Utc::now())
    }

    pub fn abort_at(
        &mut self,
        reason: impl Into<String>,
        finished_at: DateTime<Utc>,
    ) -> Result<(), DeployError> {
        self.ensure_in_progress()?;
        self.outcome = Outcome::Aborted {
            finished_at,
            reason: reason.into(),
        };
        Ok(())
    }

    fn ensure_in_progress(&self) -> Result<(), DeployError> {
        match self.finished_at() {
            None => Ok(()),
            Some(finished_at) => Err(DeployError::AlreadyTerminal {
                state: self.state(),
                finished_at,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::DeployErrorKind;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 8, 4, 9, minute, 0).unwrap()
    }

    fn pending() -> PendingDeploy {
        PendingDeploy::new(User::new("U1", "Test User"), "Test deploy")
    }

    #[test]
    fn start_produces_in_progress_record() {
        let before = Utc::now();
        let deploy = pending().start();

        assert!(deploy.is_in_progress());
        assert_eq!(deploy.state(), DeployState::InProgress);
        assert!(deploy.started_at() >= before);
        assert!(deploy.finished_at().is_none());
        assert!(deploy.abort_reason().is_none());
    }

    #[test]
    fn finish_sets_terminal_fields() {
        let mut deploy = pending().start_at(at(28));
        deploy.finish_at(at(38)).unwrap();

        assert_eq!(deploy.state(), DeployState::Finished);
        assert_eq!(deploy.finished_at(), Some(at(38)));
        assert!(!deploy.is_aborted());
    }

    #[test]
    fn abort_records_reason() {
        let mut deploy = pending().start_at(at(28));
        deploy.abort_at("something went wrong", at(30)).unwrap();

        assert!(deploy.is_aborted());
        assert_eq!(deploy.abort_reason(), Some("something went wrong"));
        assert_eq!(deploy.finished_at(), Some(at(30)));
    }

    #[test]
    fn abort_accepts_empty_reason() {
        let mut deploy = pending().start();
        deploy.abort("").unwrap();

        assert_eq!(deploy.state(), DeployState::Aborted);
        assert_eq!(deploy.abort_reason(), Some(""));
    }

    #[test]
    fn terminal_record_rejects_further_transitions() {
        let mut deploy = pending().start_at(at(28));
        deploy.finish_at(at(38)).unwrap();

        let err = deploy.abort_at("late", at(40)).unwrap_err();
        assert_eq!(err.kind(), DeployErrorKind::AlreadyTerminal);
        assert_eq!(deploy.finished_at(), Some(at(38)));
        assert!(!deploy.is_aborted());

        assert!(deploy.finish().is_err());
    }

    #[test]
    fn serializes_outcome_inline() {
        let mut deploy = pending().start_at(at(28));
        deploy.abort_at("oops", at(29)).unwrap();

        let json = serde_json::to_value(&deploy).unwrap();
        assert_eq!(json["state"], "aborted");
        assert_eq!(json["reason"], "oops");
        assert_eq!(json["subject"], "Test deploy");
        assert_eq!(json["user"]["name"], "Test User");

        let back: Deploy = serde_json::from_value(json).unwrap();
        assert_eq!(back, deploy);
    }

    #[test]
    fn in_progress_serializes_without_finish_time() {
        let deploy = pending().start_at(at(28));
        let json = serde_json::to_value(&deploy).unwrap();
        assert_eq!(json["state"], "in_progress");
        assert!(json.get("finished_at").is_none());
    }
}
