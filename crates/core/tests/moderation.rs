use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use mafia_core::{
    CancellationToken, Error, ErrorKind, GameState, Role, ScenarioDocument, Side, User,
};


use base::{admin, classic, harness, harness_with, player, RecordingGateway};

fn role_counts<'a>(roles: impl IntoIterator<Item = &'a Role>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for role in roles {
        *counts.entry(role.name.clone()).or_insert(0) += 1;
    }
    counts
}

#[test]
fn full_round_from_scenario_to_delivery() {
    let h = harness();
    let admin = admin();
    let moderator = player(10);

    let scenario = h.service.create_scenario(&admin, classic()).unwrap();
    let room = h.service.create_room(&admin, "Friday night").unwrap();
    for id in 10..19 {
        h.service.join_room(&player(id), room.id).unwrap();
    }
    h.service.set_moderator(&moderator, room.id, &moderator).unwrap();

    let game = h.service.create_game(&moderator, room.id, scenario.id).unwrap();
    assert_eq!(game.state, GameState::WaitingForPlayers);
    assert_eq!(
        h.service.room(room.id).unwrap().scenario_name.as_deref(),
        Some("Classic")
    );

    let assignments = h.service.assign_roles(&moderator, game.id).unwrap();
    assert_eq!(assignments.len(), 9);
    assert_eq!(
        assignments.keys().copied().collect::<Vec<_>>(),
        (10..19).collect::<Vec<_>>()
    );
    let counts = role_counts(assignments.values());
    assert_eq!(counts["Godfather"], 1);
    assert_eq!(counts["Consigliere"], 1);
    assert_eq!(counts["Detective"], 1);
    assert_eq!(counts["Doctor"], 1);
    assert_eq!(counts["Villager"], 5);
    assert!(!counts.contains_key("Mafioso"));

    let delivered = h.service.confirm_and_deliver(&moderator, game.id).unwrap();
    assert_eq!(delivered, 9);
    let sent = h.gateway.sent();
    assert_eq!(sent.len(), 9);
    for message in &sent {
        let role = &assignments[&message.chat_id];
        assert!(message.text.contains(&role.name));
        assert!(!message.text.contains("Mafia") && !message.text.contains("Town"));
    }

    let started = h.service.start_game(&moderator, game.id).unwrap();
    assert_eq!(started.state, GameState::InProgress);
    assert_eq!(started.assignments, assignments);
}

#[test]
fn outsiders_cannot_assign_and_nothing_changes() {
    let h = harness();
    let admin = admin();
    let scenario = h.service.create_scenario(&admin, classic()).unwrap();
    let room = h.service.create_room(&admin, "Lobby").unwrap();
    for id in 10..19 {
        h.service.join_room(&player(id), room.id).unwrap();
    }
    let game = h.service.create_game(&admin, room.id, scenario.id).unwrap();
    h.notifier.consume();

    let err = h.service.assign_roles(&player(11), game.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let unchanged = h.service.game(game.id).unwrap();
    assert_eq!(unchanged, game);
    assert!(!h.notifier.check());
}

#[test]
fn scenario_that_does_not_fit_leaves_game_waiting() {
    let h = harness();
    let admin = admin();
    let scenario = h
        .service
        .create_scenario(
            &admin,
            ScenarioDocument {
                name: "Fixed".into(),
                sides: vec![
                    Side::new("Mafia").with_role(Role::new("Don")),
                    Side::new("Town").with_role(Role::new("Sheriff")),
                ],
            },
        )
        .unwrap();
    let room = h.service.create_room(&admin, "Small room").unwrap();
    for id in [10, 20, 30] {
        h.service.join_room(&player(id), room.id).unwrap();
    }
    let game = h.service.create_game(&admin, room.id, scenario.id).unwrap();

    let err = h.service.assign_roles(&admin, game.id).unwrap_err();
    assert!(matches!(err, Error::PlayerRoleMismatch { players: 3, roles: 2 }));
    assert_eq!(h.service.game(game.id).unwrap().state, GameState::WaitingForPlayers);
}

#[test]
fn one_game_per_room() {
    let h = harness();
    let admin = admin();
    let scenario = h.service.create_scenario(&admin, classic()).unwrap();
    let room = h.service.create_room(&admin, "Lobby").unwrap();

    let first = h.service.create_game(&admin, room.id, scenario.id).unwrap();
    let err = h.service.create_game(&admin, room.id, scenario.id).unwrap_err();
    assert!(matches!(err, Error::RoomHasGame(id) if id == room.id));

    h.service.delete_game(&admin, first.id).unwrap();
    assert!(h.service.room(room.id).unwrap().scenario_name.is_none());
    assert!(h.service.create_game(&admin, room.id, scenario.id).is_ok());
}

#[test]
fn reassignment_sees_new_players_and_raises_once() {
    let h = harness();
    let admin = admin();
    let scenario = h.service.create_scenario(&admin, classic()).unwrap();
    let room = h.service.create_room(&admin, "Lobby").unwrap();
    for id in 10..16 {
        h.service.join_room(&player(id), room.id).unwrap();
    }
    let game = h.service.create_game(&admin, room.id, scenario.id).unwrap();
    let first = h.service.assign_roles(&admin, game.id).unwrap();
    assert_eq!(first.len(), 6);

    // Joining after the deal does not touch it
    h.service.join_room(&player(16), room.id).unwrap();
    assert_eq!(h.service.game(game.id).unwrap().assignments, first);

    h.notifier.consume();
    let second = h.service.assign_roles(&admin, game.id).unwrap();
    assert_eq!(second.len(), 7);
    assert!(second.contains_key(&16));
    assert!(h.notifier.consume());
    assert!(!h.notifier.consume());
}

#[test]
fn membership_rules() {
    let h = harness();
    let admin = admin();
    let room = h.service.create_room(&admin, "Lobby").unwrap();
    let alice = player(10);

    h.service.join_room(&alice, room.id).unwrap();
    let err = h.service.join_room(&alice, room.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyJoined);

    let err = h.service.kick_player(&player(11), room.id, 10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert!(h.service.room(room.id).unwrap().has_player(10));

    h.service.kick_player(&admin, room.id, 10).unwrap();
    let err = h.service.leave_room(&alice, room.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotAMember);

    let err = h.service.create_room(&alice, "Mine").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    let err = h.service.create_room(&admin, "ab").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn moderator_can_only_be_claimed_once() {
    let h = harness();
    let admin = admin();
    let room = h.service.create_room(&admin, "Lobby").unwrap();

    h.service.set_moderator(&player(10), room.id, &player(10)).unwrap();
    let err = h
        .service
        .set_moderator(&player(11), room.id, &player(11))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    // The moderator may hand over
    let room = h.service.set_moderator(&player(10), room.id, &player(11)).unwrap();
    assert!(room.is_moderator(11));
}

#[test]
fn deleting_a_room_deletes_its_game() {
    let h = harness();
    let admin = admin();
    let scenario = h.service.create_scenario(&admin, classic()).unwrap();
    let room = h.service.create_room(&admin, "Lobby").unwrap();
    let game = h.service.create_game(&admin, room.id, scenario.id).unwrap();

    h.service.delete_room(&admin, room.id).unwrap();
    assert!(h.service.list_rooms().is_empty());
    assert_eq!(h.service.game(game.id).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn missing_scenario_is_an_invariant_violation() {
    let h = harness();
    let admin = admin();
    let scenario = h.service.create_scenario(&admin, classic()).unwrap();
    let room = h.service.create_room(&admin, "Lobby").unwrap();
    h.service.join_room(&player(10), room.id).unwrap();
    let game = h.service.create_game(&admin, room.id, scenario.id).unwrap();

    h.service.delete_scenario(&admin, scenario.id).unwrap();
    let err = h.service.assign_roles(&admin, game.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvariantViolation);
    assert!(!err.user_message().contains(&scenario.id.to_string()));
}

#[test]
fn unreachable_players_are_skipped() {
    let h = harness_with(RecordingGateway::failing_for(&[12]));
    let admin = admin();
    let scenario = h.service.create_scenario(&admin, classic()).unwrap();
    let room = h.service.create_room(&admin, "Lobby").unwrap();
    for id in 10..16 {
        h.service.join_room(&player(id), room.id).unwrap();
    }
    let game = h.service.create_game(&admin, room.id, scenario.id).unwrap();
    h.service.assign_roles(&admin, game.id).unwrap();

    assert_eq!(h.service.confirm_and_deliver(&admin, game.id).unwrap(), 5);
    assert!(h.gateway.sent().iter().all(|s| s.chat_id != 12));
}

#[test]
fn cancelled_assignment_is_not_published() {
    let h = harness();
    let admin = admin();
    let scenario = h.service.create_scenario(&admin, classic()).unwrap();
    let room = h.service.create_room(&admin, "Lobby").unwrap();
    h.service.join_room(&player(10), room.id).unwrap();
    let game = h.service.create_game(&admin, room.id, scenario.id).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = h.service.assign_roles_with(&admin, game.id, &cancel).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(h.service.game(game.id).unwrap().assignments.is_empty());
}

#[test]
fn readers_never_see_partial_assignments() {
    let h = Arc::new(harness());
    let admin = admin();
    let scenario = h.service.create_scenario(&admin, classic()).unwrap();
    let room = h.service.create_room(&admin, "Lobby").unwrap();
    for id in 10..19 {
        h.service.join_room(&player(id), room.id).unwrap();
    }
    let game = h.service.create_game(&admin, room.id, scenario.id).unwrap();

    let writers: Vec<_> = (0..4)
        .map(|_| {
            let h = h.clone();
            let admin: User = admin.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    h.service.assign_roles(&admin, game.id).unwrap();
                }
            })
        })
        .collect();
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let h = h.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    let game = h.service.game(game.id).unwrap();
                    match game.state {
                        GameState::WaitingForPlayers => assert!(game.assignments.is_empty()),
                        _ => {
                            assert_eq!(game.assignments.len(), 9);
                            assert_eq!(role_counts(game.assignments.values())["Villager"], 5);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }
    assert_eq!(h.service.game(game.id).unwrap().state, GameState::RolesAssigned);
}
