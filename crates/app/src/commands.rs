//! Parsing of chat input: slash commands and button callbacks

use mafia_core::UserId;
use uuid::Uuid;

pub const HELP: &str = "\
/rooms - list rooms
/newroom <name> - open a room (admins)
/delroom <room> - delete a room (admins)
/join <room> - join a room
/leave <room> - leave a room
/kick <room> <player_id> - remove a player (moderator)
/moderate <room> - become the room's moderator
/scenario <json> - add a scenario (admins)
/scenarios - list scenarios
/delscenario <scenario> - delete a scenario (admins)
/newgame <room> <scenario> - create a game (moderator)
/assign <game> - deal roles (moderator)
/confirm <game> - send every player their role (moderator)
/startgame <game> - start a dealt game (moderator)
/finish <game> - finish a game (moderator)
/delgame <game> - delete a game (moderator)
/help - this text";

/// One line of console input
#[derive(Debug, Clone, PartialEq)]
pub struct Incoming {
    pub user_id: UserId,
    pub username: Option<String>,
    pub input: Input,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(Command),
    Callback(Callback),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Rooms,
    NewRoom(String),
    DeleteRoom(Uuid),
    Join(Uuid),
    Leave(Uuid),
    Kick { room: Uuid, player: UserId },
    Moderate(Uuid),
    Scenario(String),
    Scenarios,
    DeleteScenario(Uuid),
    NewGame { room: Uuid, scenario: Uuid },
    Assign(Uuid),
    Confirm(Uuid),
    StartGame(Uuid),
    Finish(Uuid),
    DeleteGame(Uuid),
    Help,
}

/// Inline button presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
    Join(Uuid),
    Leave(Uuid),
    Assign(Uuid),
    Confirm(Uuid),
}

impl Callback {
    pub fn encode(&self) -> String {
        match self {
            Callback::Join(id) => format!("join:{}", id),
            Callback::Leave(id) => format!("leave:{}", id),
            Callback::Assign(id) => format!("assign:{}", id),
            Callback::Confirm(id) => format!("confirm:{}", id),
        }
    }

    pub fn parse(data: &str) -> Result<Self, String> {
        let (action, id) = data
            .split_once(':')
            .ok_or_else(|| format!("malformed callback `{}`", data))?;
        let id = parse_id(id)?;
        match action {
            "join" => Ok(Callback::Join(id)),
            "leave" => Ok(Callback::Leave(id)),
            "assign" => Ok(Callback::Assign(id)),
            "confirm" => Ok(Callback::Confirm(id)),
            other => Err(format!("unknown callback `{}`", other)),
        }
    }
}

impl Command {
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.trim();
        let (name, rest) = match text.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (text, ""),
        };
        let mut args = rest.split_whitespace();

        let command = match name {
            "/rooms" => Command::Rooms,
            "/newroom" if !rest.is_empty() => Command::NewRoom(rest.to_string()),
            "/delroom" => Command::DeleteRoom(id_arg(&mut args)?),
            "/join" => Command::Join(id_arg(&mut args)?),
            "/leave" => Command::Leave(id_arg(&mut args)?),
            "/kick" => Command::Kick {
                room: id_arg(&mut args)?,
                player: args
                    .next()
                    .and_then(|p| p.parse().ok())
                    .ok_or("expected a player id")?,
            },
            "/moderate" => Command::Moderate(id_arg(&mut args)?),
            "/scenario" if !rest.is_empty() => Command::Scenario(rest.to_string()),
            "/scenarios" => Command::Scenarios,
            "/delscenario" => Command::DeleteScenario(id_arg(&mut args)?),
            "/newgame" => Command::NewGame {
                room: id_arg(&mut args)?,
                scenario: id_arg(&mut args)?,
            },
            "/assign" => Command::Assign(id_arg(&mut args)?),
            "/confirm" => Command::Confirm(id_arg(&mut args)?),
            "/startgame" => Command::StartGame(id_arg(&mut args)?),
            "/finish" => Command::Finish(id_arg(&mut args)?),
            "/delgame" => Command::DeleteGame(id_arg(&mut args)?),
            "/help" | "/start" => Command::Help,
            "/newroom" | "/scenario" => return Err(format!("{} needs an argument", name)),
            other => return Err(format!("unknown command `{}`, try /help", other)),
        };
        Ok(command)
    }
}

impl Incoming {
    /// Parse `<user_id>[:<username>] <text>`
    pub fn parse(line: &str) -> Result<Self, String> {
        let (sender, text) = line
            .trim()
            .split_once(char::is_whitespace)
            .ok_or("expected `<user_id>[:<username>] <text>`")?;
        let (user_id, username) = match sender.split_once(':') {
            Some((id, name)) if !name.is_empty() => (id, Some(name.to_string())),
            Some((id, _)) => (id, None),
            None => (sender, None),
        };
        let user_id = user_id
            .parse()
            .map_err(|_| format!("`{}` is not a user id", user_id))?;

        let text = text.trim();
        let input = match text.strip_prefix("#cb") {
            Some(data) => Input::Callback(Callback::parse(data.trim())?),
            None if text.starts_with('/') => Input::Command(Command::parse(text)?),
            None => return Err("only commands and button presses are understood".to_string()),
        };

        Ok(Self {
            user_id,
            username,
            input,
        })
    }
}

fn id_arg<'a>(args: &mut impl Iterator<Item = &'a str>) -> Result<Uuid, String> {
    parse_id(args.next().ok_or("expected an id")?)
}

fn parse_id(text: &str) -> Result<Uuid, String> {
    Uuid::parse_str(text.trim()).map_err(|_| format!("`{}` is not a valid id", text))
}
