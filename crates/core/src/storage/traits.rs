//! Storage repository traits
//!
//! These traits define the storage interface the moderation service
//! relies on. Every method is atomic with respect to its own store.

use uuid::Uuid;

use crate::error::Result;
use crate::models::{Assignments, Game, Room, Scenario};

/// Room repository operations
pub trait RoomRepository {
    /// Store a new room
    fn insert_room(&self, room: Room);

    /// Snapshot of a room
    fn find_room(&self, id: Uuid) -> Option<Room>;

    /// Snapshots of all rooms, oldest first
    fn list_rooms(&self) -> Vec<Room>;

    /// Apply `change` to a copy of the room and publish it if it succeeds.
    /// Returns the published room alongside the closure's output.
    fn update_room<T>(
        &self,
        id: Uuid,
        change: impl FnOnce(&mut Room) -> Result<T>,
    ) -> Result<(Room, T)>;

    /// Remove a room
    fn delete_room(&self, id: Uuid) -> Option<Room>;
}

/// Scenario repository operations
pub trait ScenarioRepository {
    /// Store a validated scenario
    fn insert_scenario(&self, scenario: Scenario);

    /// Snapshot of a scenario
    fn find_scenario(&self, id: Uuid) -> Option<Scenario>;

    /// All scenarios sorted by name
    fn list_scenarios(&self) -> Vec<Scenario>;

    /// Remove a scenario
    fn delete_scenario(&self, id: Uuid) -> Option<Scenario>;
}

/// Game repository operations
pub trait GameRepository {
    /// Store a new game; fails if its room already has one
    fn create_game(&self, game: Game) -> Result<()>;

    /// Snapshot of a game
    fn find_game(&self, id: Uuid) -> Option<Game>;

    /// The game bound to a room, if any
    fn find_game_for_room(&self, room_id: Uuid) -> Option<Game>;

    /// Replace a game's assignments and mark it `RolesAssigned` in one step
    fn publish_assignments(&self, id: Uuid, assignments: Assignments) -> Result<Game>;

    /// Apply `change` to a copy of the game and publish it if it succeeds
    fn update_game(&self, id: Uuid, change: impl FnOnce(&mut Game) -> Result<()>) -> Result<Game>;

    /// Remove a game
    fn delete_game(&self, id: Uuid) -> Option<Game>;
}
