// ABOUTME: Deploy tracking: records, their lifecycle, and the per-channel tracker.
// ABOUTME: Exports the entity types, the tracker, and its error types.

mod error;
mod lock;
mod record;
mod tracker;

pub use error::{DeployError, DeployErrorKind};
pub use lock::{ChannelGuard, ChannelLocks};
pub use record::{Deploy, DeployState, PendingDeploy};
pub use tracker::{ChannelDeploys, StartOutcome};
