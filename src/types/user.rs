// ABOUTME: Chat user who initiates deploys.
// ABOUTME: Identity is the platform id; the display name is only for rendering.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A chat user as reported by the command originator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Whether both values refer to the same platform user.
    pub fn same_as(&self, other: &User) -> bool {
        self.id == other.id
    }
}

// Display names change; two users are the same user iff their ids match.
impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_display_name() {
        let before = User::new("U1", "alice");
        let renamed = User::new("U1", "Alice Liddell");
        assert_eq!(before, renamed);
        assert_ne!(before, User::new("U2", "alice"));
    }

    #[test]
    fn displays_name() {
        assert_eq!(User::new("U1", "Test User").to_string(), "Test User");
    }
}
