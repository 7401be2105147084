//! Permission system for moderation commands

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::models::{Room, User, UserId};

/// Usernames with administrator rights. Built once at startup.
#[derive(Debug, Clone, Default)]
pub struct AdminList {
    usernames: HashSet<String>,
}

impl AdminList {
    pub fn new<I, S>(usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            usernames: usernames
                .into_iter()
                .map(|u| normalize_username(u.as_ref()))
                .filter(|u| !u.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, username: &str) -> bool {
        self.usernames.contains(&normalize_username(username))
    }

    /// Build the requester for an incoming message, deriving `admin`
    pub fn identify(&self, id: UserId, username: Option<&str>, first_name: &str) -> User {
        User {
            id,
            username: username.map(str::to_string),
            first_name: first_name.to_string(),
            last_name: None,
            admin: username.is_some_and(|u| self.contains(u)),
        }
    }

    pub fn len(&self) -> usize {
        self.usernames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usernames.is_empty()
    }
}

/// `@Name` and `name` refer to the same account
pub fn normalize_username(username: &str) -> String {
    username.trim().trim_start_matches('@').to_lowercase()
}

/// Commands that need more than plain membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Scenario management
    CreateScenario,
    DeleteScenario,

    // Room management
    CreateRoom,
    DeleteRoom,
    KickPlayer,
    ChangeModerator,

    // Games
    CreateGame,
    AssignRoles,
    DeliverRoles,
    StartGame,
    FinishGame,
    DeleteGame,
}

impl Action {
    pub fn description(&self) -> &'static str {
        match self {
            Action::CreateScenario => "create scenarios",
            Action::DeleteScenario => "delete scenarios",
            Action::CreateRoom => "create rooms",
            Action::DeleteRoom => "delete rooms",
            Action::KickPlayer => "kick players",
            Action::ChangeModerator => "change the moderator",
            Action::CreateGame => "create games",
            Action::AssignRoles => "assign roles",
            Action::DeliverRoles => "deliver roles",
            Action::StartGame => "start games",
            Action::FinishGame => "finish games",
            Action::DeleteGame => "delete games",
        }
    }
}

/// Permission matrix for moderation commands
pub struct PermissionMatrix;

impl PermissionMatrix {
    /// Check if `requester` may perform `action` in `room`
    pub fn can_perform(requester: &User, room: Option<&Room>, action: Action) -> bool {
        if requester.admin {
            return true;
        }

        let is_moderator = room.is_some_and(|r| r.is_moderator(requester.id));
        match action {
            // Administrators only
            Action::CreateScenario
            | Action::DeleteScenario
            | Action::CreateRoom
            | Action::DeleteRoom => false,

            // A room without a moderator can be claimed by anyone
            Action::ChangeModerator => {
                is_moderator || room.is_some_and(|r| r.moderator.is_none())
            }

            // Moderator of the room
            Action::KickPlayer
            | Action::CreateGame
            | Action::AssignRoles
            | Action::DeliverRoles
            | Action::StartGame
            | Action::FinishGame
            | Action::DeleteGame => is_moderator,
        }
    }

    /// Like [`can_perform`](Self::can_perform) but as a `Result`
    pub fn require(requester: &User, room: Option<&Room>, action: Action) -> Result<()> {
        if Self::can_perform(requester, room, action) {
            Ok(())
        } else {
            Err(Error::PermissionDenied(format!(
                "only administrators or the room moderator can {}",
                action.description()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_moderated_by(id: UserId) -> Room {
        let mut room = Room::new("Lobby").unwrap();
        room.moderator = Some(User::new(id, "Mod").as_player());
        room
    }

    #[test]
    fn test_admin_list_normalizes() {
        let admins = AdminList::new(["@Alice", "bob ", ""]);
        assert_eq!(admins.len(), 2);
        assert!(admins.contains("alice"));
        assert!(admins.contains("@BOB"));
        assert!(!admins.contains("carol"));

        assert!(admins.identify(1, Some("Alice"), "A").admin);
        assert!(!admins.identify(2, None, "B").admin);
    }

    #[test]
    fn test_admin_can_do_everything() {
        let admin = User {
            admin: true,
            ..User::new(1, "Admin")
        };
        assert!(PermissionMatrix::can_perform(&admin, None, Action::CreateScenario));
        assert!(PermissionMatrix::can_perform(&admin, Some(&room_moderated_by(9)), Action::AssignRoles));
    }

    #[test]
    fn test_moderator_permissions() {
        let room = room_moderated_by(9);
        let moderator = User::new(9, "Mod");
        let player = User::new(10, "Player");

        assert!(PermissionMatrix::can_perform(&moderator, Some(&room), Action::AssignRoles));
        assert!(PermissionMatrix::can_perform(&moderator, Some(&room), Action::KickPlayer));
        assert!(!PermissionMatrix::can_perform(&moderator, Some(&room), Action::DeleteRoom));
        assert!(!PermissionMatrix::can_perform(&player, Some(&room), Action::AssignRoles));
        assert!(PermissionMatrix::require(&player, Some(&room), Action::CreateGame).is_err());
    }

    #[test]
    fn test_unmoderated_room_can_be_claimed() {
        let room = Room::new("Lobby").unwrap();
        let player = User::new(10, "Player");
        assert!(PermissionMatrix::can_perform(&player, Some(&room), Action::ChangeModerator));
        assert!(!PermissionMatrix::can_perform(
            &player,
            Some(&room_moderated_by(9)),
            Action::ChangeModerator
        ));
    }
}
