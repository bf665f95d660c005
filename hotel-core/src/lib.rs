pub mod availability;
pub mod clock;
pub mod events;
pub mod guest;
pub mod lifecycle;
pub mod locks;
pub mod memory;
pub mod reconciler;
pub mod registry;
pub mod repository;
pub mod reservation;
pub mod room;

use std::sync::Arc;

pub use availability::AvailabilityChecker;
pub use clock::{Clock, FixedClock, SystemClock};
pub use events::{DeactivationReason, EventBus, HotelEvent, ReservationDeactivated};
pub use guest::{Guest, GuestUpdate, NewGuest};
pub use lifecycle::{ReservationManager, StayOutcome};
pub use locks::RoomLocks;
pub use memory::MemoryStore;
pub use reconciler::Reconciler;
pub use registry::{GuestRegistry, RoomRegistry};
pub use repository::{
    GuestRepository, Repositories, ReservationFilter, ReservationRepository, RoomRepository,
};
pub use reservation::{
    GuestSummary, NewReservation, Reservation, ReservationDetails, ReservationStatus,
    ReservationUpdate, RoomSummary,
};
pub use room::{NewRoom, Room, RoomStatus, RoomType, RoomUpdate};

/// Failures reported by a repository implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate value for unique field `{field}`")]
    Duplicate { field: String },
    #[error("overlapping reservation for the same room")]
    Overlap,
    #[error("{0} is still referenced by reservations")]
    Referenced(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    State(String),
    #[error("Storage failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { field } => {
                CoreError::Validation(format!("A record with this {} already exists.", field))
            }
            StoreError::Overlap => CoreError::Conflict(
                "Room is not available for the selected period due to other reservations."
                    .to_string(),
            ),
            StoreError::Referenced(what) => CoreError::Validation(format!(
                "{} cannot be deleted while reservations reference it.",
                what
            )),
            backend @ StoreError::Backend(_) => CoreError::Store(backend),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

/// The wired-up set of services the HTTP layer talks to.
#[derive(Clone)]
pub struct Hotel {
    pub rooms: RoomRegistry,
    pub guests: GuestRegistry,
    pub reservations: ReservationManager,
    pub events: EventBus,
}

impl Hotel {
    pub fn new(repos: Repositories, clock: Arc<dyn Clock>, events: EventBus) -> Self {
        let rooms = repos.rooms.clone();
        let guests = GuestRegistry::new(repos.guests.clone());
        let reservations = ReservationManager::new(repos, clock, events.clone());
        Self {
            rooms: RoomRegistry::new(rooms, reservations.locks().clone()),
            guests,
            reservations,
            events,
        }
    }

    /// In-memory wiring used by tests and by the binary when no database is configured.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(Repositories::in_memory(), clock, EventBus::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use tokio::sync::Notify;
    use uuid::Uuid;

    /// Room store that can hold the next `find_room` until told to go on.
    struct PausingRooms {
        inner: Arc<MemoryStore>,
        armed: AtomicBool,
        paused: Notify,
        resume: Notify,
    }

    #[async_trait]
    impl RoomRepository for PausingRooms {
        async fn insert_room(&self, room: &Room) -> StoreResult<()> {
            self.inner.insert_room(room).await
        }

        async fn find_room(&self, id: Uuid) -> StoreResult<Option<Room>> {
            let found = self.inner.find_room(id).await?;
            if self.armed.swap(false, Ordering::SeqCst) {
                self.paused.notify_one();
                self.resume.notified().await;
            }
            Ok(found)
        }

        async fn find_room_by_number(&self, number: &str) -> StoreResult<Option<Room>> {
            self.inner.find_room_by_number(number).await
        }

        async fn list_rooms(&self) -> StoreResult<Vec<Room>> {
            self.inner.list_rooms().await
        }

        async fn update_room(&self, room: &Room) -> StoreResult<bool> {
            self.inner.update_room(room).await
        }

        async fn delete_room(&self, id: Uuid) -> StoreResult<bool> {
            self.inner.delete_room(id).await
        }
    }

    #[tokio::test]
    async fn test_room_edit_waits_for_check_in() {
        let store = Arc::new(MemoryStore::new());
        let rooms = Arc::new(PausingRooms {
            inner: store.clone(),
            armed: AtomicBool::new(false),
            paused: Notify::new(),
            resume: Notify::new(),
        });
        let repos = Repositories {
            rooms: rooms.clone(),
            guests: store.clone(),
            reservations: store.clone(),
        };
        let today: NaiveDate = "2024-01-02".parse().unwrap();
        let hotel = Hotel::new(repos, Arc::new(FixedClock(today)), EventBus::default());

        let room = hotel
            .rooms
            .create(NewRoom {
                number: "501".into(),
                room_type: RoomType::Simple,
                status: None,
                nightly_rate: 100.0,
            })
            .await
            .unwrap();
        let guest = hotel
            .guests
            .create(NewGuest {
                name: "Rita Melo".into(),
                document: "4242".into(),
                phone: "555-0177".into(),
                email: "rita@example.com".into(),
            })
            .await
            .unwrap();
        let reservation = hotel
            .reservations
            .create(NewReservation {
                check_in: "2024-01-02".parse().unwrap(),
                check_out: "2024-01-04".parse().unwrap(),
                room_id: room.id,
                guest_id: guest.id,
            })
            .await
            .unwrap();

        rooms.armed.store(true, Ordering::SeqCst);
        let check_in = {
            let hotel = hotel.clone();
            tokio::spawn(async move { hotel.reservations.check_in(reservation.id).await })
        };
        rooms.paused.notified().await;

        let edit = {
            let hotel = hotel.clone();
            let id = room.id;
            tokio::spawn(async move {
                hotel
                    .rooms
                    .update(
                        id,
                        RoomUpdate {
                            nightly_rate: Some(250.0),
                            ..Default::default()
                        },
                    )
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!edit.is_finished());

        rooms.resume.notify_one();
        check_in.await.unwrap().unwrap();
        let edited = edit.await.unwrap().unwrap();
        assert_eq!(edited.status, RoomStatus::Occupied);
        assert_eq!(edited.nightly_rate, 250.0);

        let stored = store.find_room(room.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RoomStatus::Occupied);
        assert_eq!(stored.nightly_rate, 250.0);
    }

    #[test]
    fn store_errors_map_to_client_errors() {
        let err: CoreError = StoreError::Duplicate { field: "number".into() }.into();
        assert!(matches!(err, CoreError::Validation(ref m) if m.contains("number")));

        let err: CoreError = StoreError::Overlap.into();
        assert!(matches!(err, CoreError::Conflict(_)));

        let err: CoreError = StoreError::Referenced("Room".into()).into();
        assert!(matches!(err, CoreError::Validation(_)));

        let err: CoreError = StoreError::Backend("connection reset".into()).into();
        assert!(matches!(err, CoreError::Store(StoreError::Backend(_))));
    }
}
