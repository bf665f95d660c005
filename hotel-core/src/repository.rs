use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::guest::Guest;
use crate::memory::MemoryStore;
use crate::reservation::{Reservation, ReservationStatus};
use crate::room::Room;
use crate::StoreResult;

/// Repository trait for room data access
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn insert_room(&self, room: &Room) -> StoreResult<()>;

    async fn find_room(&self, id: Uuid) -> StoreResult<Option<Room>>;

    async fn find_room_by_number(&self, number: &str) -> StoreResult<Option<Room>>;

    async fn list_rooms(&self) -> StoreResult<Vec<Room>>;

    /// Returns `false` when no room with this id exists.
    async fn update_room(&self, room: &Room) -> StoreResult<bool>;

    async fn delete_room(&self, id: Uuid) -> StoreResult<bool>;
}

/// Repository trait for guest data access
#[async_trait]
pub trait GuestRepository: Send + Sync {
    async fn insert_guest(&self, guest: &Guest) -> StoreResult<()>;

    async fn find_guest(&self, id: Uuid) -> StoreResult<Option<Guest>>;

    async fn find_guest_by_document(&self, document: &str) -> StoreResult<Option<Guest>>;

    async fn find_guest_by_email(&self, email: &str) -> StoreResult<Option<Guest>>;

    async fn list_guests(&self) -> StoreResult<Vec<Guest>>;

    async fn update_guest(&self, guest: &Guest) -> StoreResult<bool>;

    async fn delete_guest(&self, id: Uuid) -> StoreResult<bool>;
}

/// Repository trait for reservation data access
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn insert_reservation(&self, reservation: &Reservation) -> StoreResult<()>;

    async fn find_reservation(&self, id: Uuid) -> StoreResult<Option<Reservation>>;

    async fn list_reservations(&self, filter: &ReservationFilter) -> StoreResult<Vec<Reservation>>;

    async fn count_reservations(&self, filter: &ReservationFilter) -> StoreResult<u64>;

    async fn update_reservation(&self, reservation: &Reservation) -> StoreResult<bool>;

    async fn delete_reservation(&self, id: Uuid) -> StoreResult<bool>;
}

/// Conjunctive query over reservations. Unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationFilter {
    pub room_id: Option<Uuid>,
    pub guest_id: Option<Uuid>,
    /// Empty means any status.
    pub statuses: Vec<ReservationStatus>,
    /// Half-open `[check_in, check_out)` window the reservation must intersect.
    pub overlapping: Option<(NaiveDate, NaiveDate)>,
    pub check_in_from: Option<NaiveDate>,
    pub exclude_id: Option<Uuid>,
}

impl ReservationFilter {
    pub fn for_room(room_id: Uuid) -> Self {
        Self {
            room_id: Some(room_id),
            ..Default::default()
        }
    }

    pub fn guest(mut self, guest_id: Uuid) -> Self {
        self.guest_id = Some(guest_id);
        self
    }

    pub fn status(mut self, status: ReservationStatus) -> Self {
        if !self.statuses.contains(&status) {
            self.statuses.push(status);
        }
        self
    }

    pub fn overlapping(mut self, check_in: NaiveDate, check_out: NaiveDate) -> Self {
        self.overlapping = Some((check_in, check_out));
        self
    }

    pub fn check_in_from(mut self, date: NaiveDate) -> Self {
        self.check_in_from = Some(date);
        self
    }

    pub fn excluding(mut self, id: Option<Uuid>) -> Self {
        self.exclude_id = id;
        self
    }

    pub fn matches(&self, reservation: &Reservation) -> bool {
        if self.room_id.is_some_and(|id| id != reservation.room_id) {
            return false;
        }
        if self.guest_id.is_some_and(|id| id != reservation.guest_id) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&reservation.status) {
            return false;
        }
        if let Some((check_in, check_out)) = self.overlapping {
            if !reservation.overlaps(check_in, check_out) {
                return false;
            }
        }
        if self.check_in_from.is_some_and(|from| reservation.check_in < from) {
            return false;
        }
        if self.exclude_id == Some(reservation.id) {
            return false;
        }
        true
    }
}

/// Handles to the three entity stores.
#[derive(Clone)]
pub struct Repositories {
    pub rooms: Arc<dyn RoomRepository>,
    pub guests: Arc<dyn GuestRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            rooms: store.clone(),
            guests: store.clone(),
            reservations: store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reservation::NewReservation;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_filter_matching() {
        let room_id = Uuid::new_v4();
        let mut r = Reservation::new(&NewReservation {
            check_in: date("2024-03-10"),
            check_out: date("2024-03-12"),
            room_id,
            guest_id: Uuid::new_v4(),
        });

        let blocking = ReservationFilter::for_room(room_id)
            .status(ReservationStatus::Active)
            .status(ReservationStatus::Completed)
            .overlapping(date("2024-03-11"), date("2024-03-15"));
        assert!(blocking.matches(&r));
        assert!(!blocking.clone().excluding(Some(r.id)).matches(&r));
        assert!(!ReservationFilter::for_room(Uuid::new_v4()).matches(&r));
        assert!(!ReservationFilter::default().check_in_from(date("2024-03-11")).matches(&r));
        assert!(ReservationFilter::default().check_in_from(date("2024-03-10")).matches(&r));

        r.status = ReservationStatus::Cancelled;
        assert!(!blocking.matches(&r));
    }

    #[test]
    fn test_status_is_not_duplicated() {
        let filter = ReservationFilter::default()
            .status(ReservationStatus::Active)
            .status(ReservationStatus::Active);
        assert_eq!(filter.statuses, vec![ReservationStatus::Active]);
    }
}
