//! Game store
//!
//! Games are keyed by id. At most one game exists per room; the check and
//! the insert happen under the same write lock.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use super::{read_lock, write_lock, GameRepository};
use crate::error::{Error, Result};
use crate::invariants::assert_game_invariants;
use crate::models::{Assignments, Game};

#[derive(Debug, Default)]
pub struct GameStore {
    games: RwLock<HashMap<Uuid, Game>>,
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameRepository for GameStore {
    fn create_game(&self, game: Game) -> Result<()> {
        let mut games = write_lock(&self.games, "games");
        if games.values().any(|g| g.room_id == game.room_id) {
            return Err(Error::RoomHasGame(game.room_id));
        }
        games.insert(game.id, game);
        Ok(())
    }

    fn find_game(&self, id: Uuid) -> Option<Game> {
        read_lock(&self.games, "games").get(&id).cloned()
    }

    fn find_game_for_room(&self, room_id: Uuid) -> Option<Game> {
        read_lock(&self.games, "games")
            .values()
            .find(|g| g.room_id == room_id)
            .cloned()
    }

    fn publish_assignments(&self, id: Uuid, assignments: Assignments) -> Result<Game> {
        let mut games = write_lock(&self.games, "games");
        let current = games
            .get(&id)
            .ok_or_else(|| Error::NotFound(format!("game {}", id)))?;
        if !current.state.can_assign() {
            return Err(Error::InvalidInput(format!(
                "roles cannot be dealt while the game is {}",
                current.state
            )));
        }

        let next = current.with_assignments(assignments);
        assert_game_invariants(&next);
        games.insert(id, next.clone());
        Ok(next)
    }

    fn update_game(&self, id: Uuid, change: impl FnOnce(&mut Game) -> Result<()>) -> Result<Game> {
        let mut games = write_lock(&self.games, "games");
        let current = games
            .get(&id)
            .ok_or_else(|| Error::NotFound(format!("game {}", id)))?;

        let mut next = current.clone();
        change(&mut next)?;
        assert_game_invariants(&next);
        games.insert(id, next.clone());
        Ok(next)
    }

    fn delete_game(&self, id: Uuid) -> Option<Game> {
        write_lock(&self.games, "games").remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameState, Role};

    #[test]
    fn test_one_game_per_room() {
        let store = GameStore::new();
        let room_id = Uuid::new_v4();
        store.create_game(Game::new(room_id, Uuid::new_v4())).unwrap();

        let err = store.create_game(Game::new(room_id, Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, Error::RoomHasGame(id) if id == room_id));

        // a different room is fine
        store.create_game(Game::new(Uuid::new_v4(), Uuid::new_v4())).unwrap();
    }

    #[test]
    fn test_delete_frees_room() {
        let store = GameStore::new();
        let room_id = Uuid::new_v4();
        let game = Game::new(room_id, Uuid::new_v4());
        let id = game.id;
        store.create_game(game).unwrap();
        store.delete_game(id).unwrap();
        store.create_game(Game::new(room_id, Uuid::new_v4())).unwrap();
    }

    #[test]
    fn test_publish_assignments() {
        let store = GameStore::new();
        let game = Game::new(Uuid::new_v4(), Uuid::new_v4());
        let id = game.id;
        store.create_game(game).unwrap();

        let villager = Role::new("Villager").stamped("Town");
        let mafioso = Role::new("Mafioso").stamped("Mafia");

        let assignments = Assignments::from([(1, villager.clone()), (2, mafioso.clone())]);
        let published = store.publish_assignments(id, assignments.clone()).unwrap();
        assert_eq!(published.state, GameState::RolesAssigned);
        assert_eq!(store.find_game(id).unwrap().assignments, assignments);

        // reassignment overwrites
        let again = Assignments::from([(1, mafioso), (2, villager)]);
        store.publish_assignments(id, again.clone()).unwrap();
        assert_eq!(store.find_game(id).unwrap().assignments, again);
    }

    #[test]
    fn test_publish_rejected_once_started() {
        let store = GameStore::new();
        let game = Game::new(Uuid::new_v4(), Uuid::new_v4());
        let id = game.id;
        store.create_game(game).unwrap();
        store
            .update_game(id, |g| {
                g.state = GameState::Finished;
                Ok(())
            })
            .unwrap();

        let err = store.publish_assignments(id, Assignments::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
