//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use std::collections::BTreeSet;

use crate::models::{Game, GameState, Role, Room, UserId};

/// Validate that a game record is internally consistent
pub fn assert_game_invariants(game: &Game) {
    // Nothing is dealt before the first assignment
    debug_assert!(
        game.state != GameState::WaitingForPlayers || game.assignments.is_empty(),
        "Game {} is waiting for players but has {} assignments",
        game.id,
        game.assignments.len()
    );

    // Every dealt role carries the side it came from
    debug_assert!(
        game.assignments.values().all(|r| r.side.is_some()),
        "Game {} has an assignment without a side label",
        game.id
    );
}

/// Validate freshly dealt assignments against the player snapshot and the
/// expanded roles they were dealt from
pub fn assert_assignment_invariants(game: &Game, players: &[UserId], expanded: &[Role]) {
    let keys: BTreeSet<UserId> = game.assignments.keys().copied().collect();
    let expected: BTreeSet<UserId> = players.iter().copied().collect();
    debug_assert!(
        keys == expected,
        "Game {} assignments cover {:?}, players are {:?}",
        game.id,
        keys,
        expected
    );

    let mut dealt: Vec<&str> = game.assignments.values().map(|r| r.name.as_str()).collect();
    let mut wanted: Vec<&str> = expanded.iter().map(|r| r.name.as_str()).collect();
    dealt.sort_unstable();
    wanted.sort_unstable();
    debug_assert!(
        dealt == wanted,
        "Game {} dealt roles {:?}, expansion was {:?}",
        game.id,
        dealt,
        wanted
    );
}

/// Validate that a room is internally consistent
pub fn assert_room_invariants(room: &Room) {
    let unique: BTreeSet<UserId> = room.players.iter().map(|p| p.id).collect();
    debug_assert!(
        unique.len() == room.players.len(),
        "Room {} lists a player twice",
        room.id
    );

    debug_assert!(!room.name.trim().is_empty(), "Room {} has empty name", room.id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignments, Player};
    use uuid::Uuid;

    fn labelled(name: &str) -> Role {
        Role::new(name).stamped("Town")
    }

    #[test]
    fn test_valid_assignment() {
        let game = Game::new(Uuid::new_v4(), Uuid::new_v4()).with_assignments(Assignments::from([
            (1, labelled("Doctor")),
            (2, labelled("Villager")),
        ]));
        assert_game_invariants(&game);
        assert_assignment_invariants(&game, &[2, 1], &[labelled("Villager"), labelled("Doctor")]);
    }

    #[test]
    #[should_panic(expected = "assignments cover")]
    fn test_missing_player() {
        let game = Game::new(Uuid::new_v4(), Uuid::new_v4())
            .with_assignments(Assignments::from([(1, labelled("Doctor"))]));
        assert_assignment_invariants(&game, &[1, 2], &[labelled("Doctor")]);
    }

    #[test]
    #[should_panic(expected = "without a side label")]
    fn test_unlabelled_role() {
        let game = Game::new(Uuid::new_v4(), Uuid::new_v4())
            .with_assignments(Assignments::from([(1, Role::new("Doctor"))]));
        assert_game_invariants(&game);
    }

    #[test]
    #[should_panic(expected = "twice")]
    fn test_duplicate_player() {
        let mut room = Room::new("Lobby").unwrap();
        let p = Player {
            id: 7,
            username: None,
            name: "P7".into(),
        };
        room.players.push(p.clone());
        room.players.push(p);
        assert_room_invariants(&room);
    }
}
