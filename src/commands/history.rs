// ABOUTME: History command implementation.
// ABOUTME: Prints a channel's deploys using the dashboard renderer.

use chrono::{DateTime, Utc};
use deploylog::dashboard::Renderer;
use deploylog::error::{Error, Result};
use deploylog::output::Output;
use deploylog::store::Backend;
use deploylog::types::ChannelId;

use super::Completion;

pub async fn history(
    backend: &dyn Backend,
    channel: &ChannelId,
    since: Option<&str>,
    renderer: &Renderer,
    output: &Output,
) -> Result<Completion> {
    let deploys = match since {
        Some(raw) => {
            let since = DateTime::parse_from_rfc3339(raw)
                .map_err(|_| Error::InvalidTime(raw.to_string()))?
                .with_timezone(&Utc);
            backend.since(channel, since).await?
        }
        None => backend.all(channel).await?,
    };

    output.history(&renderer.render(&deploys), &deploys);
    Ok(Completion::Done)
}
