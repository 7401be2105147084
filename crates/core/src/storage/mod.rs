//! In-memory storage layer
//!
//! Each store owns its map behind its own `RwLock`. Reads hand out clones,
//! writes replace whole records, so a reader never observes a half-applied
//! change. No operation holds more than one store lock at a time.

mod games;
mod rooms;
mod scenarios;
mod traits;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use games::GameStore;
pub use rooms::RoomStore;
pub use scenarios::ScenarioStore;
pub use traits::{GameRepository, RoomRepository, ScenarioRepository};

/// All stores of a running bot
#[derive(Debug, Default)]
pub struct Stores {
    rooms: RoomStore,
    scenarios: ScenarioStore,
    games: GameStore,
}

impl Stores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rooms(&self) -> &RoomStore {
        &self.rooms
    }

    pub fn scenarios(&self) -> &ScenarioStore {
        &self.scenarios
    }

    pub fn games(&self) -> &GameStore {
        &self.games
    }
}

fn read_lock<'a, T>(lock: &'a RwLock<T>, store: &'static str) -> RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|poisoned| {
        tracing::error!(store, "Store lock poisoned, recovering");
        poisoned.into_inner()
    })
}

fn write_lock<'a, T>(lock: &'a RwLock<T>, store: &'static str) -> RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|poisoned| {
        tracing::error!(store, "Store lock poisoned, recovering");
        poisoned.into_inner()
    })
}
