use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::room::RoomStatus;

/// Why a reservation stopped holding its room.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeactivationReason {
    Cancelled,
    Completed,
    Deleted,
    CheckedOut,
    /// Still active, but moved to another room.
    Moved,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReservationDeactivated {
    pub reservation_id: Uuid,
    pub room_id: Uuid,
    pub reason: DeactivationReason,
    /// Calendar date the deactivation happened on.
    pub on: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HotelEvent {
    ReservationCreated {
        reservation_id: Uuid,
        room_id: Uuid,
        guest_id: Uuid,
        timestamp: i64,
    },
    ReservationDeactivated {
        #[serde(flatten)]
        event: ReservationDeactivated,
        timestamp: i64,
    },
    GuestCheckedIn {
        reservation_id: Uuid,
        room_id: Uuid,
        timestamp: i64,
    },
    RoomStatusChanged {
        room_id: Uuid,
        from: RoomStatus,
        to: RoomStatus,
        timestamp: i64,
    },
}

impl HotelEvent {
    pub fn deactivated(event: ReservationDeactivated) -> Self {
        HotelEvent::ReservationDeactivated {
            event,
            timestamp: Utc::now().timestamp(),
        }
    }

    pub fn room_status_changed(room_id: Uuid, from: RoomStatus, to: RoomStatus) -> Self {
        HotelEvent::RoomStatusChanged {
            room_id,
            from,
            to,
            timestamp: Utc::now().timestamp(),
        }
    }

    /// Same value as the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            HotelEvent::ReservationCreated { .. } => "reservation_created",
            HotelEvent::ReservationDeactivated { .. } => "reservation_deactivated",
            HotelEvent::GuestCheckedIn { .. } => "guest_checked_in",
            HotelEvent::RoomStatusChanged { .. } => "room_status_changed",
        }
    }

    pub fn room_id(&self) -> Uuid {
        match self {
            HotelEvent::ReservationCreated { room_id, .. }
            | HotelEvent::GuestCheckedIn { room_id, .. }
            | HotelEvent::RoomStatusChanged { room_id, .. } => *room_id,
            HotelEvent::ReservationDeactivated { event, .. } => event.room_id,
        }
    }
}

/// Fan-out of domain events to whoever is listening.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<HotelEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HotelEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: HotelEvent) {
        // No receivers is the normal state when nobody is streaming.
        if self.tx.send(event).is_err() {
            tracing::trace!("event dropped, no subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
