//! Moderation service - the command/query surface presenters call
//!
//! Every command loads what it needs from the stores, checks permissions,
//! does its work without holding any store lock, and writes the result
//! back in a single store call. Successful mutations raise the refresh
//! signal and publish a [`ModerationEvent`].

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::instrument;
use uuid::Uuid;

use crate::dealer::{deal, RoleShuffler};
use crate::error::{Error, Result};
use crate::events::{EventSink, LogEventSink, ModerationEvent};
use crate::gateway::{escape_markdown, ChatGateway, SendOptions};
use crate::invariants::{assert_assignment_invariants, assert_room_invariants};
use crate::models::{Assignments, Game, GameState, Role, Room, Scenario, ScenarioDocument, User, UserId};
use crate::notify::RefreshSignal;
use crate::permissions::{Action, PermissionMatrix};
use crate::scenario::parse_document;
use crate::storage::{GameRepository, RoomRepository, ScenarioRepository, Stores};

/// Shuffler shared by every deal in the process
pub type SharedShuffler = Mutex<Box<dyn RoleShuffler + Send>>;

pub struct ModeratorService {
    stores: Arc<Stores>,
    shuffler: SharedShuffler,
    gateway: Arc<dyn ChatGateway>,
    refresh: Arc<dyn RefreshSignal>,
    events: Arc<dyn EventSink>,
}

impl ModeratorService {
    pub fn new(
        stores: Arc<Stores>,
        shuffler: Box<dyn RoleShuffler + Send>,
        gateway: Arc<dyn ChatGateway>,
        refresh: Arc<dyn RefreshSignal>,
    ) -> Self {
        Self {
            stores,
            shuffler: Mutex::new(shuffler),
            gateway,
            refresh,
            events: Arc::new(LogEventSink),
        }
    }

    /// Replace the default log sink
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    // ------------------------------------------------------------------
    // Scenarios
    // ------------------------------------------------------------------

    /// Parse, validate and store a JSON scenario document
    pub fn create_scenario_from_document(&self, requester: &User, document: &str) -> Result<Scenario> {
        PermissionMatrix::require(requester, None, Action::CreateScenario)?;
        let document = parse_document(document)?;
        self.create_scenario(requester, document)
    }

    /// Validate and store an already parsed scenario document
    #[instrument(skip(self, requester, document), fields(requester = requester.id, scenario = %document.name))]
    pub fn create_scenario(&self, requester: &User, document: ScenarioDocument) -> Result<Scenario> {
        PermissionMatrix::require(requester, None, Action::CreateScenario)?;
        let scenario = Scenario::from_document(document)?;
        self.stores.scenarios().insert_scenario(scenario.clone());

        tracing::info!(scenario_id = %scenario.id, "Scenario created");
        self.publish(ModerationEvent::ScenarioCreated {
            scenario_id: scenario.id,
            name: scenario.name.clone(),
        });
        Ok(scenario)
    }

    #[instrument(skip(self, requester), fields(requester = requester.id))]
    pub fn delete_scenario(&self, requester: &User, scenario_id: Uuid) -> Result<()> {
        PermissionMatrix::require(requester, None, Action::DeleteScenario)?;
        self.stores
            .scenarios()
            .delete_scenario(scenario_id)
            .ok_or_else(|| not_found("scenario", scenario_id))?;

        self.publish(ModerationEvent::ScenarioDeleted { scenario_id });
        Ok(())
    }

    pub fn list_scenarios(&self) -> Vec<Scenario> {
        self.stores.scenarios().list_scenarios()
    }

    pub fn scenario(&self, scenario_id: Uuid) -> Result<Scenario> {
        self.stores
            .scenarios()
            .find_scenario(scenario_id)
            .ok_or_else(|| not_found("scenario", scenario_id))
    }

    // ------------------------------------------------------------------
    // Rooms
    // ------------------------------------------------------------------

    #[instrument(skip(self, requester), fields(requester = requester.id))]
    pub fn create_room(&self, requester: &User, name: &str) -> Result<Room> {
        PermissionMatrix::require(requester, None, Action::CreateRoom)?;
        let room = Room::new(name)?;
        self.stores.rooms().insert_room(room.clone());

        tracing::info!(room_id = %room.id, name = %room.name, "Room created");
        self.publish(ModerationEvent::RoomCreated {
            room_id: room.id,
            name: room.name.clone(),
        });
        Ok(room)
    }

    /// Remove a room together with its game
    #[instrument(skip(self, requester), fields(requester = requester.id))]
    pub fn delete_room(&self, requester: &User, room_id: Uuid) -> Result<()> {
        let room = self.room(room_id)?;
        PermissionMatrix::require(requester, Some(&room), Action::DeleteRoom)?;

        self.stores
            .rooms()
            .delete_room(room_id)
            .ok_or_else(|| not_found("room", room_id))?;
        if let Some(game) = self.stores.games().find_game_for_room(room_id) {
            self.stores.games().delete_game(game.id);
            self.publish(ModerationEvent::GameDeleted { game_id: game.id });
        }

        self.publish(ModerationEvent::RoomDeleted { room_id });
        Ok(())
    }

    #[instrument(skip(self, requester), fields(requester = requester.id))]
    pub fn join_room(&self, requester: &User, room_id: Uuid) -> Result<Room> {
        let (room, ()) = self
            .stores
            .rooms()
            .update_room(room_id, |room| room.add_player(requester.as_player()))?;
        assert_room_invariants(&room);

        self.publish(ModerationEvent::PlayerJoined {
            room_id,
            user_id: requester.id,
        });
        Ok(room)
    }

    #[instrument(skip(self, requester), fields(requester = requester.id))]
    pub fn leave_room(&self, requester: &User, room_id: Uuid) -> Result<Room> {
        let (room, _) = self
            .stores
            .rooms()
            .update_room(room_id, |room| room.remove_player(requester.id))?;

        self.publish(ModerationEvent::PlayerLeft {
            room_id,
            user_id: requester.id,
        });
        Ok(room)
    }

    #[instrument(skip(self, requester), fields(requester = requester.id))]
    pub fn kick_player(&self, requester: &User, room_id: Uuid, player_id: UserId) -> Result<Room> {
        // Permission is checked against the same snapshot that is modified
        let (room, _) = self.stores.rooms().update_room(room_id, |room| {
            PermissionMatrix::require(requester, Some(room), Action::KickPlayer)?;
            room.remove_player(player_id)
        })?;

        tracing::info!(%room_id, player_id, "Player kicked");
        self.publish(ModerationEvent::PlayerKicked {
            room_id,
            user_id: player_id,
            by: requester.id,
        });
        Ok(room)
    }

    /// Make `moderator` the room's moderator
    #[instrument(skip(self, requester, moderator), fields(requester = requester.id, moderator = moderator.id))]
    pub fn set_moderator(&self, requester: &User, room_id: Uuid, moderator: &User) -> Result<Room> {
        let (room, ()) = self.stores.rooms().update_room(room_id, |room| {
            PermissionMatrix::require(requester, Some(room), Action::ChangeModerator)?;
            room.moderator = Some(moderator.as_player());
            Ok(())
        })?;

        self.publish(ModerationEvent::ModeratorChanged {
            room_id,
            user_id: moderator.id,
        });
        Ok(room)
    }

    pub fn list_rooms(&self) -> Vec<Room> {
        self.stores.rooms().list_rooms()
    }

    pub fn room(&self, room_id: Uuid) -> Result<Room> {
        self.stores
            .rooms()
            .find_room(room_id)
            .ok_or_else(|| not_found("room", room_id))
    }

    // ------------------------------------------------------------------
    // Games
    // ------------------------------------------------------------------

    #[instrument(skip(self, requester), fields(requester = requester.id))]
    pub fn create_game(&self, requester: &User, room_id: Uuid, scenario_id: Uuid) -> Result<Game> {
        let room = self.room(room_id)?;
        PermissionMatrix::require(requester, Some(&room), Action::CreateGame)?;
        let scenario = self.scenario(scenario_id)?;

        let game = Game::new(room_id, scenario_id);
        self.stores.games().create_game(game.clone())?;

        // Label only; a room deleted meanwhile is not an error here
        let labelled = self.stores.rooms().update_room(room_id, |room| {
            room.scenario_name = Some(scenario.name.clone());
            Ok(())
        });
        if let Err(e) = labelled {
            tracing::warn!(%room_id, error = %e, "Could not label room with scenario");
        }

        tracing::info!(game_id = %game.id, %room_id, %scenario_id, "Game created");
        self.publish(ModerationEvent::GameCreated {
            game_id: game.id,
            room_id,
            scenario_id,
        });
        Ok(game)
    }

    /// Deal roles for a game. See [`assign_roles_with`](Self::assign_roles_with).
    pub fn assign_roles(&self, requester: &User, game_id: Uuid) -> Result<Assignments> {
        self.assign_roles_with(requester, game_id, &CancellationToken::new())
    }

    /// Expand the game's scenario for the room's current players, deal the
    /// roles and publish them on the game.
    ///
    /// Reassignment of an already dealt game overwrites the earlier deal.
    /// `cancel` is checked between steps; a cancelled call leaves the game
    /// untouched.
    #[instrument(skip(self, requester, cancel), fields(requester = requester.id))]
    pub fn assign_roles_with(
        &self,
        requester: &User,
        game_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Assignments> {
        let game = self.game(game_id)?;
        let room = self.stores.rooms().find_room(game.room_id).ok_or_else(|| {
            dangling(&game, "room", game.room_id)
        })?;
        let scenario = self
            .stores
            .scenarios()
            .find_scenario(game.scenario_id)
            .ok_or_else(|| dangling(&game, "scenario", game.scenario_id))?;

        PermissionMatrix::require(requester, Some(&room), Action::AssignRoles)?;
        if !game.state.can_assign() {
            return Err(Error::InvalidInput(format!(
                "roles cannot be dealt while the game is {}",
                game.state
            )));
        }
        checkpoint(cancel)?;

        // `room` is a snapshot; later joins do not affect this deal
        let players = room.sorted_player_ids();
        let expanded = scenario.expand(players.len()).inspect_err(|e| {
            tracing::warn!(%game_id, scenario = %scenario.name, error = %e, "Scenario does not fit room");
        })?;
        checkpoint(cancel)?;

        let assignments = {
            let mut shuffler = self.shuffler.lock().unwrap_or_else(|poisoned| {
                tracing::error!("Shuffler mutex poisoned, recovering");
                poisoned.into_inner()
            });
            checkpoint(cancel)?;
            deal(&expanded, &players, &mut **shuffler)?
        };
        checkpoint(cancel)?;

        let published = self.stores.games().publish_assignments(game_id, assignments)?;
        assert_assignment_invariants(&published, &players, &expanded);

        tracing::info!(%game_id, players = players.len(), "Roles assigned");
        self.publish(ModerationEvent::RolesAssigned {
            game_id,
            players: players.len(),
        });
        Ok(published.assignments)
    }

    /// Send every player their role. See [`confirm_and_deliver_with`](Self::confirm_and_deliver_with).
    pub fn confirm_and_deliver(&self, requester: &User, game_id: Uuid) -> Result<usize> {
        self.confirm_and_deliver_with(requester, game_id, &CancellationToken::new())
    }

    /// Privately message each player the name of their role.
    ///
    /// Delivery failures are logged and counted but never roll anything
    /// back. Returns the number of messages delivered.
    #[instrument(skip(self, requester, cancel), fields(requester = requester.id))]
    pub fn confirm_and_deliver_with(
        &self,
        requester: &User,
        game_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<usize> {
        let game = self.game(game_id)?;
        let room = self.stores.rooms().find_room(game.room_id);
        PermissionMatrix::require(requester, room.as_ref(), Action::DeliverRoles)?;

        let deliverable = matches!(game.state, GameState::RolesAssigned | GameState::InProgress);
        if !deliverable || game.assignments.is_empty() {
            return Err(Error::InvalidInput(format!(
                "game {} has no roles to deliver",
                game_id
            )));
        }

        let options = SendOptions::markdown();
        let mut delivered = 0;
        let mut failed = 0;
        for (player_id, role) in &game.assignments {
            if cancel.is_cancelled() {
                tracing::warn!(%game_id, delivered, "Role delivery cancelled");
                return Err(Error::Cancelled);
            }

            match self.gateway.send_private(*player_id, &role_message(role), &options) {
                Ok(_) => delivered += 1,
                Err(e) => {
                    failed += 1;
                    tracing::warn!(%game_id, player_id, error = %e, "Failed to deliver role");
                }
            }
        }

        tracing::info!(%game_id, delivered, failed, "Roles delivered");
        self.publish(ModerationEvent::RolesDelivered {
            game_id,
            delivered,
            failed,
        });
        Ok(delivered)
    }

    /// `RolesAssigned` -> `InProgress`
    #[instrument(skip(self, requester), fields(requester = requester.id))]
    pub fn start_game(&self, requester: &User, game_id: Uuid) -> Result<Game> {
        self.authorize_game(requester, game_id, Action::StartGame)?;
        let game = self.stores.games().update_game(game_id, |game| {
            if game.state != GameState::RolesAssigned {
                return Err(Error::InvalidInput(format!(
                    "a game that is {} cannot be started",
                    game.state
                )));
            }
            game.state = GameState::InProgress;
            Ok(())
        })?;

        self.publish(ModerationEvent::GameStarted { game_id });
        Ok(game)
    }

    /// Any state -> `Finished`
    #[instrument(skip(self, requester), fields(requester = requester.id))]
    pub fn finish_game(&self, requester: &User, game_id: Uuid) -> Result<Game> {
        self.authorize_game(requester, game_id, Action::FinishGame)?;
        let game = self.stores.games().update_game(game_id, |game| {
            game.state = GameState::Finished;
            Ok(())
        })?;

        self.publish(ModerationEvent::GameFinished { game_id });
        Ok(game)
    }

    /// Remove a game so its room can host a new one
    #[instrument(skip(self, requester), fields(requester = requester.id))]
    pub fn delete_game(&self, requester: &User, game_id: Uuid) -> Result<()> {
        let game = self.authorize_game(requester, game_id, Action::DeleteGame)?;
        self.stores
            .games()
            .delete_game(game_id)
            .ok_or_else(|| not_found("game", game_id))?;

        let cleared = self.stores.rooms().update_room(game.room_id, |room| {
            room.scenario_name = None;
            Ok(())
        });
        if let Err(e) = cleared {
            tracing::debug!(room_id = %game.room_id, error = %e, "Room gone while deleting game");
        }

        self.publish(ModerationEvent::GameDeleted { game_id });
        Ok(())
    }

    pub fn game(&self, game_id: Uuid) -> Result<Game> {
        self.stores
            .games()
            .find_game(game_id)
            .ok_or_else(|| not_found("game", game_id))
    }

    pub fn game_for_room(&self, room_id: Uuid) -> Option<Game> {
        self.stores.games().find_game_for_room(room_id)
    }

    // ------------------------------------------------------------------

    /// Load a game and check `action` against its room. A game whose room
    /// is gone can only be handled by administrators.
    fn authorize_game(&self, requester: &User, game_id: Uuid, action: Action) -> Result<Game> {
        let game = self.game(game_id)?;
        let room = self.stores.rooms().find_room(game.room_id);
        PermissionMatrix::require(requester, room.as_ref(), action)?;
        Ok(game)
    }

    fn publish(&self, event: ModerationEvent) {
        if event.affects_rooms() {
            self.refresh.raise();
        }
        if let Err(e) = self.events.publish(&event) {
            tracing::warn!(kind = event.kind(), error = %e, "Failed to publish moderation event");
        }
    }
}

/// Private message telling a player their role. Never mentions the side.
pub fn role_message(role: &Role) -> String {
    format!("Your role in this game: *{}*", escape_markdown(&role.name))
}

fn checkpoint(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

fn not_found(what: &str, id: Uuid) -> Error {
    Error::NotFound(format!("{} {}", what, id))
}

fn dangling(game: &Game, what: &str, id: Uuid) -> Error {
    tracing::error!(game_id = %game.id, missing = what, %id, "Game references a missing entity");
    Error::InvariantViolation(format!("game {} references missing {} {}", game.id, what, id))
}
