// ABOUTME: Validated channel identifier used as the key for deploy logs.
// ABOUTME: Restricted to characters that are safe in URL paths and file names.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum accepted channel identifier length.
pub const MAX_CHANNEL_ID_LEN: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelIdError {
    #[error("channel id cannot be empty")]
    Empty,

    #[error("channel id exceeds maximum length of {MAX_CHANNEL_ID_LEN} characters")]
    TooLong,

    #[error("invalid character in channel id: '{0}'")]
    InvalidChar(char),
}

/// Opaque identifier of a chat channel.
///
/// Only ASCII alphanumerics, `-` and `_` are accepted, so a channel id can be
/// used verbatim as a URL path segment and as a file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(value: &str) -> Result<Self, ChannelIdError> {
        if value.is_empty() {
            return Err(ChannelIdError::Empty);
        }

        if value.len() > MAX_CHANNEL_ID_LEN {
            return Err(ChannelIdError::TooLong);
        }

        if let Some(c) = value
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
        {
            return Err(ChannelIdError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChannelId {
    type Err = ChannelIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ChannelId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChannelId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::new(&value).map_err(serde::de::Error::custom)
    }
}
