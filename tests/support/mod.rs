// ABOUTME: Test support utilities.
// ABOUTME: Provides tracing setup and deploy fixtures for integration tests.

use std::sync::Once;

use chrono::{DateTime, TimeZone, Utc};
use deploylog::deploy::{Deploy, PendingDeploy};
use deploylog::types::{ChannelId, User};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::from_default_env().add_directive("deploylog=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[allow(dead_code)]
pub fn channel(name: &str) -> ChannelId {
    ChannelId::new(name).unwrap()
}

#[allow(dead_code)]
pub fn user(name: &str) -> User {
    User::new(format!("id-{name}"), name)
}

/// 4 Aug 2016 at `hour:minute` UTC.
#[allow(dead_code)]
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 8, 4, hour, minute, 0).unwrap()
}

#[allow(dead_code)]
pub fn finished(user: User, subject: &str, started: DateTime<Utc>, done: DateTime<Utc>) -> Deploy {
    let mut deploy = PendingDeploy::new(user, subject).start_at(started);
    deploy.finish_at(done).unwrap();
    deploy
}

#[allow(dead_code)]
pub fn aborted(
    user: User,
    subject: &str,
    reason: &str,
    started: DateTime<Utc>,
    done: DateTime<Utc>,
) -> Deploy {
    let mut deploy = PendingDeploy::new(user, subject).start_at(started);
    deploy.abort_at(reason, done).unwrap();
    deploy
}
