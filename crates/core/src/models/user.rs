//! User model

use serde::{Deserialize, Serialize};

/// Chat-platform user identifier
pub type UserId = i64;

/// A chat user issuing commands
///
/// `admin` is not stored anywhere; it is derived from the admin list each
/// time a request comes in (see [`crate::AdminList::identify`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub admin: bool,
}

impl User {
    pub fn new(id: UserId, first_name: impl Into<String>) -> Self {
        Self {
            id,
            username: None,
            first_name: first_name.into(),
            last_name: None,
            admin: false,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// Name shown in room listings
    pub fn display_name(&self) -> String {
        match (&self.last_name, &self.username) {
            (Some(last), _) => format!("{} {}", self.first_name, last),
            (None, _) if !self.first_name.trim().is_empty() => self.first_name.clone(),
            (None, Some(username)) => format!("@{}", username),
            (None, None) => format!("#{}", self.id),
        }
    }

    /// Snapshot of this user as a room member
    pub fn as_player(&self) -> Player {
        Player {
            id: self.id,
            username: self.username.clone(),
            name: self.display_name(),
        }
    }
}

/// A user as seen from inside a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: UserId,
    pub username: Option<String>,
    pub name: String,
}
