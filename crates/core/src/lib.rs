//! Mafia Core Library
//!
//! Scenario documents, role expansion and dealing, rooms and games, and
//! the moderation service that ties them together.

pub mod dealer;
pub mod error;
pub mod events;
pub mod gateway;
pub mod invariants;
pub mod models;
pub mod notify;
pub mod permissions;
pub mod scenario;
pub mod service;
pub mod storage;

pub use dealer::{deal, RoleShuffler};
pub use error::{Error, ErrorKind, Result};
pub use events::{EventSink, LogEventSink, ModerationEvent, PublishError};
pub use gateway::{escape_markdown, Button, ChatGateway, GatewayError, Markup, ParseMode, SendOptions};
pub use models::*;
pub use notify::{ChatId, MessageRef, RefreshNotifier, RefreshSignal};
pub use permissions::{Action, AdminList, PermissionMatrix};
pub use scenario::{expand_roles, CatalogEntry, ScenarioCatalog};
pub use service::{role_message, ModeratorService};
pub use storage::{GameRepository, RoomRepository, ScenarioRepository, Stores};
pub use tokio_util::sync::CancellationToken;
