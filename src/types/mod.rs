// ABOUTME: Validated domain types shared by the tracker, stores, and dashboard.
// ABOUTME: Channel identifiers and chat users.

mod channel_id;
mod user;

pub use channel_id::{ChannelId, ChannelIdError, MAX_CHANNEL_ID_LEN};
pub use user::User;
