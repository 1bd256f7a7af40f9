// ABOUTME: Start, finish, abort, and status command implementations.
// ABOUTME: Turns tracker outcomes into chat-style messages.

use deploylog::dashboard::Renderer;
use deploylog::deploy::{Deploy, PendingDeploy, StartOutcome};
use deploylog::error::Result;
use deploylog::output::Output;
use deploylog::types::{ChannelId, User};

use super::{Completion, Tracker};

/// Start a deploy of `subject` by `user`.
pub async fn start(
    tracker: &Tracker,
    channel: &ChannelId,
    user: User,
    subject: String,
    renderer: &Renderer,
    output: &Output,
) -> Result<Completion> {
    let outcome = tracker
        .start(channel, PendingDeploy::new(user, subject))
        .await?;

    if let Some(previous) = outcome.superseded() {
        output.progress(&superseded_message(previous));
    }

    match &outcome {
        StartOutcome::Started { deploy, .. } => {
            output.event("started", &started_message(deploy), Some(deploy));
            Ok(Completion::Done)
        }
        StartOutcome::Conflict { current } => {
            output.event(
                "conflict",
                &in_progress_message(current, renderer, "already deploying"),
                Some(current),
            );
            Ok(Completion::Refused)
        }
    }
}

pub async fn finish(tracker: &Tracker, channel: &ChannelId, output: &Output) -> Result<Completion> {
    match tracker.finish(channel).await? {
        Some(deploy) => {
            output.event("finished", &finished_message(&deploy), Some(&deploy));
            Ok(Completion::Done)
        }
        None => {
            output.event("idle", &idle_message(channel), None);
            Ok(Completion::Refused)
        }
    }
}

pub async fn abort(
    tracker: &Tracker,
    channel: &ChannelId,
    reason: &str,
    output: &Output,
) -> Result<Completion> {
    match tracker.abort(channel, reason).await? {
        Some(deploy) => {
            output.event("aborted", &aborted_message(&deploy), Some(&deploy));
            Ok(Completion::Done)
        }
        None => {
            output.event("idle", &idle_message(channel), None);
            Ok(Completion::Refused)
        }
    }
}

pub async fn status(
    tracker: &Tracker,
    channel: &ChannelId,
    renderer: &Renderer,
    output: &Output,
) -> Result<Completion> {
    match tracker.current(channel).await? {
        Some(deploy) => output.event(
            "in_progress",
            &in_progress_message(&deploy, renderer, "deploying"),
            Some(&deploy),
        ),
        None => output.event("idle", &idle_message(channel), None),
    }
    Ok(Completion::Done)
}

fn started_message(deploy: &Deploy) -> String {
    format!("{} is deploying {}", deploy.user(), deploy.subject())
}

fn superseded_message(previous: &Deploy) -> String {
    format!(
        "Finished previous deploy of {} by {}",
        previous.subject(),
        previous.user()
    )
}

fn in_progress_message(deploy: &Deploy, renderer: &Renderer, verb: &str) -> String {
    format!(
        "{} is {} {} since {}",
        deploy.user(),
        verb,
        deploy.subject(),
        renderer.format_time(deploy.started_at())
    )
}

fn finished_message(deploy: &Deploy) -> String {
    format!("{} finished deploying {}", deploy.user(), deploy.subject())
}

fn aborted_message(deploy: &Deploy) -> String {
    match deploy.abort_reason() {
        Some(reason) if !reason.is_empty() => format!(
            "{} aborted deploying {}: {}",
            deploy.user(),
            deploy.subject(),
            reason
        ),
        _ => format!("{} aborted deploying {}", deploy.user(), deploy.subject()),
    }
}

fn idle_message(channel: &ChannelId) -> String {
    format!("No deploy in progress in {}", channel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn deploy() -> Deploy {
        PendingDeploy::new(User::new("U1", "alice"), "api v2")
            .start_at(Utc.with_ymd_and_hms(2016, 8, 4, 9, 28, 0).unwrap())
    }

    #[test]
    fn conflict_message_names_holder_and_start() {
        assert_eq!(
            in_progress_message(&deploy(), &Renderer::default(), "already deploying"),
            "alice is already deploying api v2 since 04 Aug 16 09:28 UTC"
        );
    }

    #[test]
    fn aborted_message_includes_reason_when_given() {
        let mut with_reason = deploy();
        with_reason.abort("tests failed").unwrap();
        assert_eq!(
            aborted_message(&with_reason),
            "alice aborted deploying api v2: tests failed"
        );

        let mut without = deploy();
        without.abort("").unwrap();
        assert_eq!(aborted_message(&without), "alice aborted deploying api v2");
    }
}
