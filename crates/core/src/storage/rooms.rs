//! Room store

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use super::{read_lock, write_lock, RoomRepository};
use crate::error::{Error, Result};
use crate::models::Room;

#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: RwLock<HashMap<Uuid, Room>>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        read_lock(&self.rooms, "rooms").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RoomRepository for RoomStore {
    fn insert_room(&self, room: Room) {
        write_lock(&self.rooms, "rooms").insert(room.id, room);
    }

    fn find_room(&self, id: Uuid) -> Option<Room> {
        read_lock(&self.rooms, "rooms").get(&id).cloned()
    }

    fn list_rooms(&self) -> Vec<Room> {
        let mut rooms: Vec<Room> = read_lock(&self.rooms, "rooms").values().cloned().collect();
        rooms.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
        rooms
    }

    fn update_room<T>(
        &self,
        id: Uuid,
        change: impl FnOnce(&mut Room) -> Result<T>,
    ) -> Result<(Room, T)> {
        let mut rooms = write_lock(&self.rooms, "rooms");
        let current = rooms
            .get(&id)
            .ok_or_else(|| Error::NotFound(format!("room {}", id)))?;

        let mut next = current.clone();
        let output = change(&mut next)?;
        rooms.insert(id, next.clone());
        Ok((next, output))
    }

    fn delete_room(&self, id: Uuid) -> Option<Room> {
        write_lock(&self.rooms, "rooms").remove(&id)
    }
}
