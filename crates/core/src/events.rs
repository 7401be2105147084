//! Moderation events and the sink they are published to
//!
//! The service publishes one event per successful mutation. Sinks are
//! best-effort: a failing sink never affects the outcome of a command.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::UserId;

/// Something that happened in the moderator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModerationEvent {
    ScenarioCreated { scenario_id: Uuid, name: String },
    ScenarioDeleted { scenario_id: Uuid },
    RoomCreated { room_id: Uuid, name: String },
    RoomDeleted { room_id: Uuid },
    PlayerJoined { room_id: Uuid, user_id: UserId },
    PlayerLeft { room_id: Uuid, user_id: UserId },
    PlayerKicked { room_id: Uuid, user_id: UserId, by: UserId },
    ModeratorChanged { room_id: Uuid, user_id: UserId },
    GameCreated { game_id: Uuid, room_id: Uuid, scenario_id: Uuid },
    RolesAssigned { game_id: Uuid, players: usize },
    RolesDelivered { game_id: Uuid, delivered: usize, failed: usize },
    GameStarted { game_id: Uuid },
    GameFinished { game_id: Uuid },
    GameDeleted { game_id: Uuid },
}

impl ModerationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ModerationEvent::ScenarioCreated { .. } => "scenario_created",
            ModerationEvent::ScenarioDeleted { .. } => "scenario_deleted",
            ModerationEvent::RoomCreated { .. } => "room_created",
            ModerationEvent::RoomDeleted { .. } => "room_deleted",
            ModerationEvent::PlayerJoined { .. } => "player_joined",
            ModerationEvent::PlayerLeft { .. } => "player_left",
            ModerationEvent::PlayerKicked { .. } => "player_kicked",
            ModerationEvent::ModeratorChanged { .. } => "moderator_changed",
            ModerationEvent::GameCreated { .. } => "game_created",
            ModerationEvent::RolesAssigned { .. } => "roles_assigned",
            ModerationEvent::RolesDelivered { .. } => "roles_delivered",
            ModerationEvent::GameStarted { .. } => "game_started",
            ModerationEvent::GameFinished { .. } => "game_finished",
            ModerationEvent::GameDeleted { .. } => "game_deleted",
        }
    }

    /// Whether presenters showing rooms need to re-render
    pub fn affects_rooms(&self) -> bool {
        !matches!(
            self,
            ModerationEvent::ScenarioCreated { .. }
                | ModerationEvent::ScenarioDeleted { .. }
                | ModerationEvent::RolesDelivered { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Sink unavailable: {0}")]
    Unavailable(String),
}

/// Destination for moderation events
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &ModerationEvent) -> Result<(), PublishError>;
}

/// Sink that writes every event to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn publish(&self, event: &ModerationEvent) -> Result<(), PublishError> {
        let payload = serde_json::to_string(event)?;
        tracing::info!(kind = event.kind(), %payload, "Moderation event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_is_tagged() {
        let event = ModerationEvent::PlayerJoined {
            room_id: Uuid::nil(),
            user_id: 5,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["kind"], event.kind());
        assert_eq!(value["user_id"], 5);
        assert!(LogEventSink.publish(&event).is_ok());
    }

    #[test]
    fn test_scenario_events_do_not_touch_rooms() {
        assert!(!ModerationEvent::ScenarioDeleted { scenario_id: Uuid::nil() }.affects_rooms());
        assert!(ModerationEvent::RolesAssigned { game_id: Uuid::nil(), players: 3 }.affects_rooms());
    }
}
