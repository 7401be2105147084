//! Handler - turns console input into service calls and replies

use std::sync::Arc;

use mafia_core::{
    AdminList, ChatGateway, Markup, ModeratorService, RefreshNotifier, Result, SendOptions, User,
};
use tokio_util::sync::CancellationToken;

use crate::commands::{Callback, Command, Incoming, Input, HELP};
use crate::render;

/// What to send back to the requester
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub markup: Option<Markup>,
    /// Keep the message updated by the refresh driver
    pub tracked: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: None,
            tracked: false,
        }
    }

    fn with_markup(mut self, markup: Markup) -> Self {
        if !markup.is_empty() {
            self.markup = Some(markup);
        }
        self
    }
}

pub struct Handler {
    service: Arc<ModeratorService>,
    admins: Arc<AdminList>,
    notifier: Arc<RefreshNotifier>,
    gateway: Arc<dyn ChatGateway>,
    shutdown: CancellationToken,
}

impl Handler {
    pub fn new(
        service: Arc<ModeratorService>,
        admins: Arc<AdminList>,
        notifier: Arc<RefreshNotifier>,
        gateway: Arc<dyn ChatGateway>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            service,
            admins,
            notifier,
            gateway,
            shutdown,
        }
    }

    /// Handle one line of console input and send the reply to the sender
    pub fn handle_line(&self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        let incoming = match Incoming::parse(line) {
            Ok(incoming) => incoming,
            Err(message) => {
                tracing::warn!(line = %line.trim(), %message, "Ignoring unparsable input");
                return;
            }
        };

        let first_name = incoming
            .username
            .clone()
            .unwrap_or_else(|| format!("User {}", incoming.user_id));
        let requester = self
            .admins
            .identify(incoming.user_id, incoming.username.as_deref(), &first_name);

        let reply = match incoming.input {
            Input::Command(command) => self.dispatch(&requester, command),
            Input::Callback(callback) => self.dispatch(&requester, callback_command(callback)),
        };
        let reply = reply.unwrap_or_else(|e| {
            tracing::debug!(user_id = requester.id, kind = %e.kind(), error = %e, "Command failed");
            Reply::text(e.user_message())
        });
        self.send(requester.id, reply);
    }

    pub fn dispatch(&self, requester: &User, command: Command) -> Result<Reply> {
        let service = &self.service;
        let reply = match command {
            Command::Rooms => {
                let (text, markup) = render::room_list(&render::rooms_with_games(service));
                Reply {
                    tracked: true,
                    ..Reply::text(text).with_markup(markup)
                }
            }
            Command::NewRoom(name) => {
                let room = service.create_room(requester, &name)?;
                Reply::text(format!("Room {} created with id {}", room.name, room.id))
            }
            Command::DeleteRoom(room_id) => {
                service.delete_room(requester, room_id)?;
                Reply::text("Room deleted.")
            }
            Command::Join(room_id) => {
                let room = service.join_room(requester, room_id)?;
                Reply::text(format!("You joined {}.", room.name))
            }
            Command::Leave(room_id) => {
                let room = service.leave_room(requester, room_id)?;
                Reply::text(format!("You left {}.", room.name))
            }
            Command::Kick { room, player } => {
                let room = service.kick_player(requester, room, player)?;
                Reply::text(format!("Player {} removed from {}.", player, room.name))
            }
            Command::Moderate(room_id) => {
                let room = service.set_moderator(requester, room_id, requester)?;
                Reply::text(format!("You now moderate {}.", room.name))
            }
            Command::Scenario(document) => {
                let scenario = service.create_scenario_from_document(requester, &document)?;
                Reply::text(format!("Scenario {} added with id {}", scenario.name, scenario.id))
            }
            Command::Scenarios => Reply::text(render::scenario_list(&service.list_scenarios())),
            Command::DeleteScenario(scenario_id) => {
                service.delete_scenario(requester, scenario_id)?;
                Reply::text("Scenario deleted.")
            }
            Command::NewGame { room, scenario } => {
                let game = service.create_game(requester, room, scenario)?;
                Reply::text(format!("Game {} created.", game.id))
                    .with_markup(render::game_controls(&game))
            }
            Command::Assign(game_id) => {
                let assignments = service.assign_roles_with(requester, game_id, &self.shutdown)?;
                let game = service.game(game_id)?;
                Reply::text(format!("Roles dealt to {} players.", assignments.len()))
                    .with_markup(render::game_controls(&game))
            }
            Command::Confirm(game_id) => {
                let delivered = service.confirm_and_deliver_with(requester, game_id, &self.shutdown)?;
                let total = service.game(game_id)?.assignments.len();
                Reply::text(format!("Roles sent to {} of {} players.", delivered, total))
            }
            Command::StartGame(game_id) => {
                service.start_game(requester, game_id)?;
                Reply::text("Game started.")
            }
            Command::Finish(game_id) => {
                service.finish_game(requester, game_id)?;
                Reply::text("Game finished.")
            }
            Command::DeleteGame(game_id) => {
                service.delete_game(requester, game_id)?;
                Reply::text("Game deleted.")
            }
            Command::Help => Reply::text(HELP),
        };
        Ok(reply)
    }

    fn send(&self, chat_id: i64, reply: Reply) {
        let options = SendOptions {
            markup: reply.markup,
            ..SendOptions::default()
        };
        match self.gateway.send_private(chat_id, &reply.text, &options) {
            Ok(message) if reply.tracked => {
                self.notifier.track(message);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(chat_id, error = %e, "Failed to send reply"),
        }
    }
}

fn callback_command(callback: Callback) -> Command {
    match callback {
        Callback::Join(room) => Command::Join(room),
        Callback::Leave(room) => Command::Leave(room),
        Callback::Assign(game) => Command::Assign(game),
        Callback::Confirm(game) => Command::Confirm(game),
    }
}
