use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::guest::{Guest, GuestUpdate, NewGuest};
use crate::locks::RoomLocks;
use crate::repository::{GuestRepository, RoomRepository};
use crate::room::{NewRoom, Room, RoomUpdate};
use crate::{CoreError, CoreResult};

fn room_not_found() -> CoreError {
    CoreError::NotFound("Room not found.".to_string())
}

fn guest_not_found() -> CoreError {
    CoreError::NotFound("Guest not found.".to_string())
}

/// CRUD over rooms. Edits and deletes hold the room lock shared with the
/// reservation lifecycle.
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<dyn RoomRepository>,
    locks: RoomLocks,
}

impl RoomRegistry {
    pub fn new(rooms: Arc<dyn RoomRepository>, locks: RoomLocks) -> Self {
        Self { rooms, locks }
    }

    pub async fn create(&self, new: NewRoom) -> CoreResult<Room> {
        let room = Room::new(new)?;
        self.ensure_number_free(&room).await?;
        self.rooms.insert_room(&room).await?;
        info!(room_id = %room.id, number = %room.number, "room created");
        Ok(room)
    }

    pub async fn get(&self, id: Uuid) -> CoreResult<Room> {
        self.rooms.find_room(id).await?.ok_or_else(room_not_found)
    }

    pub async fn list(&self) -> CoreResult<Vec<Room>> {
        Ok(self.rooms.list_rooms().await?)
    }

    pub async fn update(&self, id: Uuid, update: RoomUpdate) -> CoreResult<Room> {
        let _guard = self.locks.lock(id).await;
        let mut room = self.get(id).await?;
        room.apply(update)?;
        self.ensure_number_free(&room).await?;
        if !self.rooms.update_room(&room).await? {
            return Err(room_not_found());
        }
        info!(room_id = %room.id, status = %room.status, "room updated");
        Ok(room)
    }

    pub async fn delete(&self, id: Uuid) -> CoreResult<()> {
        let _guard = self.locks.lock(id).await;
        if !self.rooms.delete_room(id).await? {
            return Err(room_not_found());
        }
        info!(room_id = %id, "room deleted");
        Ok(())
    }

    async fn ensure_number_free(&self, room: &Room) -> CoreResult<()> {
        match self.rooms.find_room_by_number(&room.number).await? {
            Some(other) if other.id != room.id => Err(CoreError::Validation(format!(
                "Room number {} is already in use.",
                room.number
            ))),
            _ => Ok(()),
        }
    }
}

/// CRUD over guests, with uniqueness on document and email.
#[derive(Clone)]
pub struct GuestRegistry {
    guests: Arc<dyn GuestRepository>,
}

impl GuestRegistry {
    pub fn new(guests: Arc<dyn GuestRepository>) -> Self {
        Self { guests }
    }

    pub async fn create(&self, new: NewGuest) -> CoreResult<Guest> {
        let guest = Guest::new(new)?;
        self.ensure_unique(&guest).await?;
        self.guests.insert_guest(&guest).await?;
        info!(guest_id = %guest.id, "guest created");
        Ok(guest)
    }

    pub async fn get(&self, id: Uuid) -> CoreResult<Guest> {
        self.guests.find_guest(id).await?.ok_or_else(guest_not_found)
    }

    pub async fn list(&self) -> CoreResult<Vec<Guest>> {
        Ok(self.guests.list_guests().await?)
    }

    pub async fn update(&self, id: Uuid, update: GuestUpdate) -> CoreResult<Guest> {
        let mut guest = self.get(id).await?;
        guest.apply(update)?;
        self.ensure_unique(&guest).await?;
        if !self.guests.update_guest(&guest).await? {
            return Err(guest_not_found());
        }
        info!(guest_id = %guest.id, "guest updated");
        Ok(guest)
    }

    pub async fn delete(&self, id: Uuid) -> CoreResult<()> {
        if !self.guests.delete_guest(id).await? {
            return Err(guest_not_found());
        }
        info!(guest_id = %id, "guest deleted");
        Ok(())
    }

    async fn ensure_unique(&self, guest: &Guest) -> CoreResult<()> {
        if let Some(other) = self.guests.find_guest_by_document(&guest.document).await? {
            if other.id != guest.id {
                return Err(CoreError::Validation(
                    "A guest with this document already exists.".to_string(),
                ));
            }
        }
        if let Some(other) = self.guests.find_guest_by_email(&guest.email).await? {
            if other.id != guest.id {
                return Err(CoreError::Validation(
                    "A guest with this email already exists.".to_string(),
                ));
            }
        }
        Ok(())
    }
}
