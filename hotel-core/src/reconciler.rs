use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use crate::events::{DeactivationReason, EventBus, HotelEvent, ReservationDeactivated};
use crate::repository::{ReservationFilter, ReservationRepository, RoomRepository};
use crate::reservation::ReservationStatus;
use crate::room::RoomStatus;
use crate::CoreResult;

/// Which remaining reservations keep a room from reverting to AVAILABLE,
/// and which room statuses are eligible to revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReleaseRule {
    /// Any other ACTIVE reservation keeps the room; any non-AVAILABLE status reverts.
    AnyActive,
    /// Any other ACTIVE reservation keeps the room; only OCCUPIED reverts.
    Vacated,
    /// Only ACTIVE reservations starting on or after the date keep the room;
    /// only OCCUPIED reverts.
    UpcomingFrom(NaiveDate),
}

impl ReleaseRule {
    fn for_event(event: &ReservationDeactivated) -> Self {
        match event.reason {
            DeactivationReason::CheckedOut => ReleaseRule::UpcomingFrom(event.on),
            // The reservation still exists elsewhere; a room someone put under
            // maintenance stays that way.
            DeactivationReason::Moved => ReleaseRule::Vacated,
            DeactivationReason::Cancelled
            | DeactivationReason::Completed
            | DeactivationReason::Deleted => ReleaseRule::AnyActive,
        }
    }

    fn releases(&self, status: RoomStatus) -> bool {
        match self {
            ReleaseRule::AnyActive => status != RoomStatus::Available,
            ReleaseRule::Vacated | ReleaseRule::UpcomingFrom(_) => status == RoomStatus::Occupied,
        }
    }
}

/// Consumes reservation-deactivated events and reverts room status when the
/// room is no longer held. The only place a room returns to AVAILABLE as a
/// consequence of reservation changes.
#[derive(Clone)]
pub struct Reconciler {
    rooms: Arc<dyn RoomRepository>,
    reservations: Arc<dyn ReservationRepository>,
    events: EventBus,
}

impl Reconciler {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        reservations: Arc<dyn ReservationRepository>,
        events: EventBus,
    ) -> Self {
        Self {
            rooms,
            reservations,
            events,
        }
    }

    /// Reverts the room to AVAILABLE when no ACTIVE reservation other than
    /// `exclude` remains for it. Returns the new status when it changed.
    pub async fn reconcile(&self, room_id: Uuid, exclude: Option<Uuid>) -> CoreResult<Option<RoomStatus>> {
        self.apply(room_id, exclude, ReleaseRule::AnyActive).await
    }

    pub async fn handle(&self, event: &ReservationDeactivated) -> CoreResult<Option<RoomStatus>> {
        debug!(
            reservation_id = %event.reservation_id,
            room_id = %event.room_id,
            reason = ?event.reason,
            "reconciling room after deactivation"
        );
        match ReleaseRule::for_event(event) {
            ReleaseRule::AnyActive => self.reconcile(event.room_id, Some(event.reservation_id)).await,
            rule => self.apply(event.room_id, Some(event.reservation_id), rule).await,
        }
    }

    async fn apply(
        &self,
        room_id: Uuid,
        exclude: Option<Uuid>,
        rule: ReleaseRule,
    ) -> CoreResult<Option<RoomStatus>> {
        let Some(mut room) = self.rooms.find_room(room_id).await? else {
            return Ok(None);
        };

        let mut filter = ReservationFilter::for_room(room_id)
            .status(ReservationStatus::Active)
            .excluding(exclude);
        if let ReleaseRule::UpcomingFrom(from) = rule {
            filter = filter.check_in_from(from);
        }

        let remaining = self.reservations.count_reservations(&filter).await?;
        if remaining > 0 || !rule.releases(room.status) {
            return Ok(None);
        }

        let previous = room.status;
        room.status = RoomStatus::Available;
        self.rooms.update_room(&room).await?;

        info!(room_id = %room_id, number = %room.number, from = %previous, "room released");
        self.events
            .publish(HotelEvent::room_status_changed(room_id, previous, RoomStatus::Available));

        Ok(Some(RoomStatus::Available))
    }
}
