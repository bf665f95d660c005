use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::repository::{ReservationFilter, ReservationRepository, RoomRepository};
use crate::reservation::ReservationStatus;
use crate::room::RoomStatus;
use crate::{CoreError, CoreResult};

/// The single gate deciding whether a room can be booked for a date range.
#[derive(Clone)]
pub struct AvailabilityChecker {
    rooms: Arc<dyn RoomRepository>,
    reservations: Arc<dyn ReservationRepository>,
}

impl AvailabilityChecker {
    pub fn new(rooms: Arc<dyn RoomRepository>, reservations: Arc<dyn ReservationRepository>) -> Self {
        Self { rooms, reservations }
    }

    /// `true` when the room exists, is not under maintenance, and no ACTIVE or
    /// COMPLETED reservation other than `exclude` intersects `[check_in, check_out)`.
    /// An empty or inverted range is never available.
    pub async fn is_available(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        exclude: Option<Uuid>,
    ) -> CoreResult<bool> {
        if check_in >= check_out {
            return Ok(false);
        }

        let room = self
            .rooms
            .find_room(room_id)
            .await?
            .ok_or_else(|| CoreError::NotFound("Room not found.".to_string()))?;

        if room.status == RoomStatus::Maintenance {
            debug!(room_id = %room_id, "room under maintenance, not bookable");
            return Ok(false);
        }

        let filter = ReservationFilter::for_room(room_id)
            .status(ReservationStatus::Active)
            .status(ReservationStatus::Completed)
            .overlapping(check_in, check_out)
            .excluding(exclude);

        let conflicts = self.reservations.count_reservations(&filter).await?;
        debug!(
            room_id = %room_id,
            %check_in,
            %check_out,
            conflicts,
            "availability checked"
        );

        Ok(conflicts == 0)
    }
}
