//! Error types for Mafia Core

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Room {0} already has a game")]
    RoomHasGame(Uuid),

    #[error("Player already joined the room")]
    AlreadyJoined,

    #[error("Player is not a member of the room")]
    NotAMember,

    #[error("Scenario yields {roles} roles for {players} players")]
    PlayerRoleMismatch { players: usize, roles: usize },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Discriminant of [`Error`], used by presenters to pick a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    PermissionDenied,
    RoomHasGame,
    AlreadyJoined,
    NotAMember,
    PlayerRoleMismatch,
    InvariantViolation,
    Cancelled,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Error::RoomHasGame(_) => ErrorKind::RoomHasGame,
            Error::AlreadyJoined => ErrorKind::AlreadyJoined,
            Error::NotAMember => ErrorKind::NotAMember,
            Error::PlayerRoleMismatch { .. } => ErrorKind::PlayerRoleMismatch,
            Error::InvariantViolation(_) => ErrorKind::InvariantViolation,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Text safe to show to a chat user.
    ///
    /// Internal failures collapse to a generic message; everything else
    /// carries its own description.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::InvariantViolation | ErrorKind::Io => self.kind().user_message().to_string(),
            _ => self.to_string(),
        }
    }
}

impl ErrorKind {
    /// Wire-style name of the kind (`NOT_FOUND`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::PermissionDenied => "PERMISSION_DENIED",
            ErrorKind::RoomHasGame => "ROOM_HAS_GAME",
            ErrorKind::AlreadyJoined => "ALREADY_JOINED",
            ErrorKind::NotAMember => "NOT_A_MEMBER",
            ErrorKind::PlayerRoleMismatch => "PLAYER_ROLE_MISMATCH",
            ErrorKind::InvariantViolation => "INVARIANT_VIOLATION",
            ErrorKind::Cancelled => "CANCELLED",
            ErrorKind::Io => "IO",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "That input is not valid.",
            ErrorKind::NotFound => "Nothing found with that identifier.",
            ErrorKind::PermissionDenied => "You are not allowed to do that.",
            ErrorKind::RoomHasGame => "This room already has a game.",
            ErrorKind::AlreadyJoined => "You are already in this room.",
            ErrorKind::NotAMember => "That player is not in this room.",
            ErrorKind::PlayerRoleMismatch => "The scenario does not fit the number of players.",
            ErrorKind::Cancelled => "The operation was cancelled.",
            ErrorKind::InvariantViolation | ErrorKind::Io => {
                "Something went wrong. Please try again later."
            }
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_violation_hides_details() {
        let err = Error::InvariantViolation("game 1 has no room".into());
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert!(!err.user_message().contains("game 1"));
    }

    #[test]
    fn test_mismatch_message_carries_counts() {
        let err = Error::PlayerRoleMismatch { players: 7, roles: 5 };
        assert_eq!(err.kind().as_str(), "PLAYER_ROLE_MISMATCH");
        assert!(err.user_message().contains('7'));
    }
}
