//! Text and buttons for the room list

use mafia_core::{Button, Game, Markup, ModeratorService, Room, Scenario};

use crate::commands::Callback;

/// Current rooms paired with their games
pub fn rooms_with_games(service: &ModeratorService) -> Vec<(Room, Option<Game>)> {
    service
        .list_rooms()
        .into_iter()
        .map(|room| {
            let game = service.game_for_room(room.id);
            (room, game)
        })
        .collect()
}

/// Render every room with its game, if any
pub fn room_list(rooms: &[(Room, Option<Game>)]) -> (String, Markup) {
    if rooms.is_empty() {
        return ("No rooms yet.".to_string(), Markup::default());
    }

    let mut text = String::from("Rooms:\n");
    let mut markup = Markup::default();
    for (room, game) in rooms {
        text.push_str(&format!("\n{} ({} players)\n", room.name, room.players.len()));
        text.push_str(&format!("  id: {}\n", room.id));
        if let Some(moderator) = &room.moderator {
            text.push_str(&format!("  moderator: {}\n", moderator.name));
        }
        if let Some(game) = game {
            text.push_str(&format!(
                "  game {}: {} ({})\n",
                game.id,
                room.scenario_name.as_deref().unwrap_or("unknown scenario"),
                game.state
            ));
        }
        if !room.players.is_empty() {
            let names: Vec<&str> = room.players.iter().map(|p| p.name.as_str()).collect();
            text.push_str(&format!("  players: {}\n", names.join(", ")));
        }

        markup = markup.row(vec![
            Button::new(format!("Join {}", room.name), Callback::Join(room.id).encode()),
            Button::new(format!("Leave {}", room.name), Callback::Leave(room.id).encode()),
        ]);
    }
    (text, markup)
}

/// Buttons the moderator gets after creating or dealing a game
pub fn game_controls(game: &Game) -> Markup {
    Markup::default().row(vec![
        Button::new("Deal roles", Callback::Assign(game.id).encode()),
        Button::new("Send roles", Callback::Confirm(game.id).encode()),
    ])
}

pub fn scenario_list(scenarios: &[Scenario]) -> String {
    if scenarios.is_empty() {
        return "No scenarios yet.".to_string();
    }
    let mut text = String::from("Scenarios:\n");
    for scenario in scenarios {
        let sides: Vec<&str> = scenario.sides.iter().map(|s| s.name.as_str()).collect();
        text.push_str(&format!(
            "{} [{}] sides: {}\n",
            scenario.name,
            scenario.id,
            sides.join(", ")
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use mafia_core::User;
    use uuid::Uuid;

    #[test]
    fn test_room_list() {
        let mut room = Room::new("Lobby").unwrap();
        room.add_player(User::new(10, "Alice").as_player()).unwrap();
        let game = Game::new(room.id, Uuid::new_v4());

        let (text, markup) = room_list(&[(room.clone(), Some(game.clone()))]);
        assert!(text.contains("Lobby (1 players)"));
        assert!(text.contains("Alice"));
        assert!(text.contains(&game.id.to_string()));
        assert_eq!(markup.rows.len(), 1);
        assert_eq!(markup.rows[0][0].callback, format!("join:{}", room.id));
    }

    #[test]
    fn test_empty_lists() {
        let (text, markup) = room_list(&[]);
        assert_eq!(text, "No rooms yet.");
        assert!(markup.is_empty());
        assert_eq!(scenario_list(&[]), "No scenarios yet.");
    }
}
