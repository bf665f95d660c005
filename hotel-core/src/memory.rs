use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::guest::Guest;
use crate::repository::{GuestRepository, ReservationFilter, ReservationRepository, RoomRepository};
use crate::reservation::Reservation;
use crate::room::Room;
use crate::{StoreError, StoreResult};

/// In-memory entity store.
///
/// Enforces the same constraints as the relational schema: unique room
/// numbers, unique guest documents and emails, restricted deletes of
/// referenced rooms and guests, and no two inventory-blocking reservations
/// overlapping on one room. Tables are locked in the order rooms, guests,
/// reservations.
#[derive(Default)]
pub struct MemoryStore {
    rooms: RwLock<HashMap<Uuid, Room>>,
    guests: RwLock<HashMap<Uuid, Guest>>,
    reservations: RwLock<HashMap<Uuid, Reservation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted<T: Clone>(values: impl Iterator<Item = T>, key: impl Fn(&T) -> String) -> Vec<T> {
    let mut list: Vec<T> = values.collect();
    list.sort_by_key(|v| key(v));
    list
}

fn check_overlap(
    table: &HashMap<Uuid, Reservation>,
    candidate: &Reservation,
) -> StoreResult<()> {
    if !candidate.status.blocks_inventory() {
        return Ok(());
    }
    let clash = table.values().any(|other| {
        other.id != candidate.id
            && other.room_id == candidate.room_id
            && other.status.blocks_inventory()
            && other.overlaps(candidate.check_in, candidate.check_out)
    });
    if clash {
        Err(StoreError::Overlap)
    } else {
        Ok(())
    }
}

#[async_trait]
impl RoomRepository for MemoryStore {
    async fn insert_room(&self, room: &Room) -> StoreResult<()> {
        let mut rooms = self.rooms.write().await;
        if rooms.values().any(|r| r.number == room.number) {
            return Err(StoreError::Duplicate { field: "number".into() });
        }
        rooms.insert(room.id, room.clone());
        Ok(())
    }

    async fn find_room(&self, id: Uuid) -> StoreResult<Option<Room>> {
        Ok(self.rooms.read().await.get(&id).cloned())
    }

    async fn find_room_by_number(&self, number: &str) -> StoreResult<Option<Room>> {
        Ok(self
            .rooms
            .read()
            .await
            .values()
            .find(|r| r.number == number)
            .cloned())
    }

    async fn list_rooms(&self) -> StoreResult<Vec<Room>> {
        let rooms = self.rooms.read().await;
        Ok(sorted(rooms.values().cloned(), |r| r.number.clone()))
    }

    async fn update_room(&self, room: &Room) -> StoreResult<bool> {
        let mut rooms = self.rooms.write().await;
        if !rooms.contains_key(&room.id) {
            return Ok(false);
        }
        if rooms.values().any(|r| r.id != room.id && r.number == room.number) {
            return Err(StoreError::Duplicate { field: "number".into() });
        }
        rooms.insert(room.id, room.clone());
        Ok(true)
    }

    async fn delete_room(&self, id: Uuid) -> StoreResult<bool> {
        let mut rooms = self.rooms.write().await;
        let reservations = self.reservations.read().await;
        if reservations.values().any(|r| r.room_id == id) {
            return Err(StoreError::Referenced("Room".into()));
        }
        Ok(rooms.remove(&id).is_some())
    }
}

#[async_trait]
impl GuestRepository for MemoryStore {
    async fn insert_guest(&self, guest: &Guest) -> StoreResult<()> {
        let mut guests = self.guests.write().await;
        if guests.values().any(|g| g.document == guest.document) {
            return Err(StoreError::Duplicate { field: "document".into() });
        }
        if guests.values().any(|g| g.email == guest.email) {
            return Err(StoreError::Duplicate { field: "email".into() });
        }
        guests.insert(guest.id, guest.clone());
        Ok(())
    }

    async fn find_guest(&self, id: Uuid) -> StoreResult<Option<Guest>> {
        Ok(self.guests.read().await.get(&id).cloned())
    }

    async fn find_guest_by_document(&self, document: &str) -> StoreResult<Option<Guest>> {
        Ok(self
            .guests
            .read()
            .await
            .values()
            .find(|g| g.document == document)
            .cloned())
    }

    async fn find_guest_by_email(&self, email: &str) -> StoreResult<Option<Guest>> {
        Ok(self
            .guests
            .read()
            .await
            .values()
            .find(|g| g.email == email)
            .cloned())
    }

    async fn list_guests(&self) -> StoreResult<Vec<Guest>> {
        let guests = self.guests.read().await;
        Ok(sorted(guests.values().cloned(), |g| g.name.clone()))
    }

    async fn update_guest(&self, guest: &Guest) -> StoreResult<bool> {
        let mut guests = self.guests.write().await;
        if !guests.contains_key(&guest.id) {
            return Ok(false);
        }
        let others = || guests.values().filter(|g| g.id != guest.id);
        if others().any(|g| g.document == guest.document) {
            return Err(StoreError::Duplicate { field: "document".into() });
        }
        if others().any(|g| g.email == guest.email) {
            return Err(StoreError::Duplicate { field: "email".into() });
        }
        guests.insert(guest.id, guest.clone());
        Ok(true)
    }

    async fn delete_guest(&self, id: Uuid) -> StoreResult<bool> {
        let mut guests = self.guests.write().await;
        let reservations = self.reservations.read().await;
        if reservations.values().any(|r| r.guest_id == id) {
            return Err(StoreError::Referenced("Guest".into()));
        }
        Ok(guests.remove(&id).is_some())
    }
}

#[async_trait]
impl ReservationRepository for MemoryStore {
    async fn insert_reservation(&self, reservation: &Reservation) -> StoreResult<()> {
        let mut reservations = self.reservations.write().await;
        check_overlap(&reservations, reservation)?;
        reservations.insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn find_reservation(&self, id: Uuid) -> StoreResult<Option<Reservation>> {
        Ok(self.reservations.read().await.get(&id).cloned())
    }

    async fn list_reservations(&self, filter: &ReservationFilter) -> StoreResult<Vec<Reservation>> {
        let reservations = self.reservations.read().await;
        let mut list: Vec<Reservation> = reservations
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        list.sort_by_key(|r| (r.check_in, r.id));
        Ok(list)
    }

    async fn count_reservations(&self, filter: &ReservationFilter) -> StoreResult<u64> {
        let reservations = self.reservations.read().await;
        Ok(reservations.values().filter(|r| filter.matches(r)).count() as u64)
    }

    async fn update_reservation(&self, reservation: &Reservation) -> StoreResult<bool> {
        let mut reservations = self.reservations.write().await;
        if !reservations.contains_key(&reservation.id) {
            return Ok(false);
        }
        check_overlap(&reservations, reservation)?;
        reservations.insert(reservation.id, reservation.clone());
        Ok(true)
    }

    async fn delete_reservation(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.reservations.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reservation::{NewReservation, ReservationStatus};
    use crate::room::{NewRoom, RoomType};
    use chrono::NaiveDate;

    fn room(number: &str) -> Room {
        Room::new(NewRoom {
            number: number.into(),
            room_type: RoomType::Simple,
            status: None,
            nightly_rate: 90.0,
        })
        .unwrap()
    }

    fn stay(room_id: Uuid, from: &str, to: &str) -> Reservation {
        Reservation::new(&NewReservation {
            check_in: from.parse::<NaiveDate>().unwrap(),
            check_out: to.parse::<NaiveDate>().unwrap(),
            room_id,
            guest_id: Uuid::new_v4(),
        })
    }

    #[tokio::test]
    async fn test_room_number_is_unique() {
        let store = MemoryStore::new();
        store.insert_room(&room("101")).await.unwrap();
        let err = store.insert_room(&room("101")).await.unwrap_err();
        assert_eq!(err, StoreError::Duplicate { field: "number".into() });
    }

    #[tokio::test]
    async fn test_overlap_constraint() {
        let store = MemoryStore::new();
        let r = room("101");
        store.insert_room(&r).await.unwrap();
        store.insert_reservation(&stay(r.id, "2024-01-01", "2024-01-05")).await.unwrap();

        let clash = stay(r.id, "2024-01-04", "2024-01-06");
        assert_eq!(store.insert_reservation(&clash).await.unwrap_err(), StoreError::Overlap);

        let mut cancelled = clash.clone();
        cancelled.status = ReservationStatus::Cancelled;
        store.insert_reservation(&cancelled).await.unwrap();

        store.insert_reservation(&stay(r.id, "2024-01-05", "2024-01-08")).await.unwrap();
    }

    #[tokio::test]
    async fn test_referenced_room_cannot_be_deleted() {
        let store = MemoryStore::new();
        let r = room("101");
        store.insert_room(&r).await.unwrap();
        let reservation = stay(r.id, "2024-01-01", "2024-01-05");
        store.insert_reservation(&reservation).await.unwrap();

        assert_eq!(
            store.delete_room(r.id).await.unwrap_err(),
            StoreError::Referenced("Room".into())
        );
        store.delete_reservation(reservation.id).await.unwrap();
        assert!(store.delete_room(r.id).await.unwrap());
        assert!(!store.delete_room(r.id).await.unwrap());
    }
}
