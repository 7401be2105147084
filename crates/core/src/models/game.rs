//! Game model - a scenario bound to a room

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Role, UserId};

/// Player id to dealt role
pub type Assignments = BTreeMap<UserId, Role>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    WaitingForPlayers,
    RolesAssigned,
    InProgress,
    Finished,
}

impl GameState {
    pub fn display_name(&self) -> &'static str {
        match self {
            GameState::WaitingForPlayers => "Waiting for players",
            GameState::RolesAssigned => "Roles assigned",
            GameState::InProgress => "In progress",
            GameState::Finished => "Finished",
        }
    }

    /// Whether roles may be (re)dealt from this state
    pub fn can_assign(&self) -> bool {
        matches!(self, GameState::WaitingForPlayers | GameState::RolesAssigned)
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A game record. Room and scenario are referenced by id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub room_id: Uuid,
    pub scenario_id: Uuid,
    pub state: GameState,
    pub assignments: Assignments,
    pub created_at: DateTime<Utc>,
}

impl Game {
    pub fn new(room_id: Uuid, scenario_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            scenario_id,
            state: GameState::WaitingForPlayers,
            assignments: Assignments::new(),
            created_at: Utc::now(),
        }
    }

    /// New record with roles dealt; the original is left untouched
    pub fn with_assignments(&self, assignments: Assignments) -> Self {
        Self {
            state: GameState::RolesAssigned,
            assignments,
            ..self.clone()
        }
    }
}
