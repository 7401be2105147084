//! Room model - the pre-game lobby

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Player, UserId};
use crate::error::{Error, Result};

/// Allowed room name length, in characters
pub const ROOM_NAME_MIN: usize = 3;
pub const ROOM_NAME_MAX: usize = 50;

/// A lobby players join before a game is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub players: Vec<Player>,
    pub moderator: Option<Player>,
    /// Label of the scenario picked for the room's game
    pub scenario_name: Option<String>,
    pub description: BTreeMap<String, String>,
}

impl Room {
    pub fn new(name: &str) -> Result<Self> {
        let name = validate_room_name(name)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
            players: Vec::new(),
            moderator: None,
            scenario_name: None,
            description: BTreeMap::new(),
        })
    }

    pub fn has_player(&self, id: UserId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    pub fn add_player(&mut self, player: Player) -> Result<()> {
        if self.has_player(player.id) {
            return Err(Error::AlreadyJoined);
        }
        self.players.push(player);
        Ok(())
    }

    pub fn remove_player(&mut self, id: UserId) -> Result<Player> {
        let index = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or(Error::NotAMember)?;
        Ok(self.players.remove(index))
    }

    pub fn is_moderator(&self, id: UserId) -> bool {
        self.moderator.as_ref().is_some_and(|m| m.id == id)
    }

    /// Player ids in ascending order
    pub fn sorted_player_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.players.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids
    }
}

/// Trim and length-check a room name
pub fn validate_room_name(name: &str) -> Result<String> {
    let name = name.trim();
    let len = name.chars().count();
    if !(ROOM_NAME_MIN..=ROOM_NAME_MAX).contains(&len) {
        return Err(Error::InvalidInput(format!(
            "room name must be {}-{} characters, got {}",
            ROOM_NAME_MIN, ROOM_NAME_MAX, len
        )));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: UserId) -> Player {
        Player {
            id,
            username: None,
            name: format!("P{}", id),
        }
    }

    #[test]
    fn test_room_name_bounds() {
        assert!(Room::new("ab").is_err());
        assert!(Room::new("abc").is_ok());
        assert!(Room::new(&"x".repeat(50)).is_ok());
        assert!(Room::new(&"x".repeat(51)).is_err());
        // counted in characters, not bytes
        assert!(Room::new("ключ").is_ok());
    }

    #[test]
    fn test_membership() {
        let mut room = Room::new("Friday night").unwrap();
        room.add_player(player(30)).unwrap();
        room.add_player(player(10)).unwrap();
        assert!(matches!(room.add_player(player(10)), Err(Error::AlreadyJoined)));
        assert_eq!(room.sorted_player_ids(), vec![10, 30]);

        room.remove_player(30).unwrap();
        assert!(matches!(room.remove_player(30), Err(Error::NotAMember)));
        assert!(!room.has_player(30));
    }
}
