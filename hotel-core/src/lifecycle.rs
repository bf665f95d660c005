use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;
use tracing::{info, warn};
use uuid::Uuid;

use crate::availability::AvailabilityChecker;
use crate::clock::Clock;
use crate::events::{DeactivationReason, EventBus, HotelEvent, ReservationDeactivated};
use crate::guest::Guest;
use crate::locks::RoomLocks;
use crate::reconciler::Reconciler;
use crate::repository::{
    GuestRepository, Repositories, ReservationFilter, ReservationRepository, RoomRepository,
};
use crate::reservation::{
    validate_range, NewReservation, Reservation, ReservationDetails, ReservationStatus,
    ReservationUpdate,
};
use crate::room::{Room, RoomStatus};
use crate::{CoreError, CoreResult};

fn reservation_not_found() -> CoreError {
    CoreError::NotFound("Reservation not found.".to_string())
}

fn room_not_found() -> CoreError {
    CoreError::NotFound("Room not found.".to_string())
}

fn guest_not_found() -> CoreError {
    CoreError::NotFound("Guest not found.".to_string())
}

/// Result of a check-in or check-out: the reservation and its room after the operation.
#[derive(Debug, Clone, Serialize)]
pub struct StayOutcome {
    pub reservation: Reservation,
    pub room: Room,
}

/// Manages reservation lifecycle and the room-status transitions it drives.
///
/// Every operation that reads, decides and writes on behalf of a room holds
/// that room's lock for the whole sequence.
#[derive(Clone)]
pub struct ReservationManager {
    rooms: Arc<dyn RoomRepository>,
    guests: Arc<dyn GuestRepository>,
    reservations: Arc<dyn ReservationRepository>,
    availability: AvailabilityChecker,
    reconciler: Reconciler,
    locks: RoomLocks,
    events: EventBus,
    clock: Arc<dyn Clock>,
}

impl ReservationManager {
    pub fn new(repos: Repositories, clock: Arc<dyn Clock>, events: EventBus) -> Self {
        Self {
            availability: AvailabilityChecker::new(repos.rooms.clone(), repos.reservations.clone()),
            reconciler: Reconciler::new(
                repos.rooms.clone(),
                repos.reservations.clone(),
                events.clone(),
            ),
            rooms: repos.rooms,
            guests: repos.guests,
            reservations: repos.reservations,
            locks: RoomLocks::new(),
            events,
            clock,
        }
    }

    /// Room locks shared with anything else that writes rooms.
    pub fn locks(&self) -> &RoomLocks {
        &self.locks
    }

    pub async fn is_available(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        exclude: Option<Uuid>,
    ) -> CoreResult<bool> {
        self.availability
            .is_available(room_id, check_in, check_out, exclude)
            .await
    }

    pub async fn get(&self, id: Uuid) -> CoreResult<Reservation> {
        self.reservations
            .find_reservation(id)
            .await?
            .ok_or_else(reservation_not_found)
    }

    pub async fn details(&self, id: Uuid) -> CoreResult<ReservationDetails> {
        let reservation = self.get(id).await?;
        let room = self.rooms.find_room(reservation.room_id).await?;
        let guest = self.guests.find_guest(reservation.guest_id).await?;
        Ok(ReservationDetails {
            room: room.as_ref().map(Into::into),
            guest: guest.as_ref().map(Into::into),
            reservation,
        })
    }

    pub async fn list(&self, filter: &ReservationFilter) -> CoreResult<Vec<ReservationDetails>> {
        let reservations = self.reservations.list_reservations(filter).await?;

        let mut rooms: HashMap<Uuid, Option<Room>> = HashMap::new();
        let mut guests: HashMap<Uuid, Option<Guest>> = HashMap::new();
        let mut details = Vec::with_capacity(reservations.len());

        for reservation in reservations {
            if !rooms.contains_key(&reservation.room_id) {
                let room = self.rooms.find_room(reservation.room_id).await?;
                rooms.insert(reservation.room_id, room);
            }
            if !guests.contains_key(&reservation.guest_id) {
                let guest = self.guests.find_guest(reservation.guest_id).await?;
                guests.insert(reservation.guest_id, guest);
            }
            details.push(ReservationDetails {
                room: rooms[&reservation.room_id].as_ref().map(Into::into),
                guest: guests[&reservation.guest_id].as_ref().map(Into::into),
                reservation,
            });
        }

        Ok(details)
    }

    /// Book a room. The reservation starts ACTIVE; the room only becomes
    /// OCCUPIED at check-in.
    pub async fn create(&self, new: NewReservation) -> CoreResult<Reservation> {
        let _guard = self.locks.lock(new.room_id).await;

        self.rooms
            .find_room(new.room_id)
            .await?
            .ok_or_else(room_not_found)?;
        self.guests
            .find_guest(new.guest_id)
            .await?
            .ok_or_else(guest_not_found)?;

        validate_range(new.check_in, new.check_out)?;

        let available = self
            .availability
            .is_available(new.room_id, new.check_in, new.check_out, None)
            .await?;
        if !available {
            warn!(room_id = %new.room_id, check_in = %new.check_in, check_out = %new.check_out, "booking rejected");
            return Err(CoreError::Conflict(
                "Room is not available for the selected period due to other reservations or maintenance."
                    .to_string(),
            ));
        }

        let reservation = Reservation::new(&new);
        self.reservations.insert_reservation(&reservation).await?;

        info!(
            reservation_id = %reservation.id,
            room_id = %reservation.room_id,
            check_in = %reservation.check_in,
            check_out = %reservation.check_out,
            "reservation created"
        );
        self.events.publish(HotelEvent::ReservationCreated {
            reservation_id: reservation.id,
            room_id: reservation.room_id,
            guest_id: reservation.guest_id,
            timestamp: Utc::now().timestamp(),
        });

        Ok(reservation)
    }

    /// Partial update. Moving the stay (room or either date) re-runs the
    /// availability check excluding this reservation; a status change must
    /// follow the transition table. Leaving ACTIVE reconciles the prior room.
    pub async fn update(&self, id: Uuid, update: ReservationUpdate) -> CoreResult<Reservation> {
        let (current, _guards) = self.lock_reservation(id, update.room_id).await?;

        let status = match update.status {
            Some(to) => current.status.transition(to)?,
            None => current.status,
        };
        let room_id = update.room_id.unwrap_or(current.room_id);
        let check_in = update.check_in.unwrap_or(current.check_in);
        let check_out = update.check_out.unwrap_or(current.check_out);

        let relocating = room_id != current.room_id
            || check_in != current.check_in
            || check_out != current.check_out;
        if relocating {
            validate_range(check_in, check_out)?;
            let available = self
                .availability
                .is_available(room_id, check_in, check_out, Some(current.id))
                .await?;
            if !available {
                warn!(reservation_id = %id, room_id = %room_id, "reservation change rejected");
                return Err(CoreError::Conflict(
                    "Cannot change reservation: room is not available for the new period or room."
                        .to_string(),
                ));
            }
        }

        let guest_id = update.guest_id.unwrap_or(current.guest_id);
        if guest_id != current.guest_id {
            self.guests
                .find_guest(guest_id)
                .await?
                .ok_or_else(guest_not_found)?;
        }

        let next = Reservation {
            id: current.id,
            check_in,
            check_out,
            status,
            room_id,
            guest_id,
        };
        if !self.reservations.update_reservation(&next).await? {
            return Err(reservation_not_found());
        }
        info!(reservation_id = %id, status = %next.status, "reservation updated");

        if current.status.is_active() {
            let reason = match next.status {
                ReservationStatus::Cancelled => Some(DeactivationReason::Cancelled),
                ReservationStatus::Completed => Some(DeactivationReason::Completed),
                ReservationStatus::Active if next.room_id != current.room_id => {
                    Some(DeactivationReason::Moved)
                }
                ReservationStatus::Active => None,
            };
            if let Some(reason) = reason {
                self.deactivate(current.id, current.room_id, reason).await?;
            }
        }

        Ok(next)
    }

    /// Remove a reservation. Deleting an ACTIVE one reconciles its room.
    pub async fn delete(&self, id: Uuid) -> CoreResult<Reservation> {
        let (current, _guards) = self.lock_reservation(id, None).await?;

        if !self.reservations.delete_reservation(id).await? {
            return Err(reservation_not_found());
        }
        info!(reservation_id = %id, status = %current.status, "reservation deleted");

        if current.status.is_active() {
            self.deactivate(current.id, current.room_id, DeactivationReason::Deleted)
                .await?;
        }

        Ok(current)
    }

    /// Mark the room OCCUPIED. The reservation itself stays ACTIVE.
    pub async fn check_in(&self, id: Uuid) -> CoreResult<StayOutcome> {
        let (reservation, _guards) = self.lock_reservation(id, None).await?;
        let mut room = self
            .rooms
            .find_room(reservation.room_id)
            .await?
            .ok_or_else(room_not_found)?;

        if reservation.status.is_terminal() {
            return Err(CoreError::State(
                "This reservation is not ACTIVE and cannot be checked in.".to_string(),
            ));
        }

        let previous = room.status;
        room.status = previous.occupy()?;
        if !self.rooms.update_room(&room).await? {
            return Err(room_not_found());
        }

        info!(reservation_id = %id, room = %room.number, "guest checked in");
        self.events.publish(HotelEvent::GuestCheckedIn {
            reservation_id: reservation.id,
            room_id: room.id,
            timestamp: Utc::now().timestamp(),
        });
        self.events
            .publish(HotelEvent::room_status_changed(room.id, previous, room.status));

        Ok(StayOutcome { reservation, room })
    }

    /// Complete the reservation and release the room unless another ACTIVE
    /// reservation starting today or later still holds it.
    pub async fn check_out(&self, id: Uuid) -> CoreResult<StayOutcome> {
        let (mut reservation, _guards) = self.lock_reservation(id, None).await?;
        self.rooms
            .find_room(reservation.room_id)
            .await?
            .ok_or_else(room_not_found)?;

        if reservation.status.is_terminal() {
            return Err(CoreError::State(
                "This reservation is not ACTIVE and cannot be checked out.".to_string(),
            ));
        }

        reservation.status = reservation.status.transition(ReservationStatus::Completed)?;
        if !self.reservations.update_reservation(&reservation).await? {
            return Err(reservation_not_found());
        }
        info!(reservation_id = %id, "guest checked out");

        self.deactivate(reservation.id, reservation.room_id, DeactivationReason::CheckedOut)
            .await?;

        let room = self
            .rooms
            .find_room(reservation.room_id)
            .await?
            .ok_or_else(room_not_found)?;

        Ok(StayOutcome { reservation, room })
    }

    async fn deactivate(
        &self,
        reservation_id: Uuid,
        room_id: Uuid,
        reason: DeactivationReason,
    ) -> CoreResult<Option<RoomStatus>> {
        let event = ReservationDeactivated {
            reservation_id,
            room_id,
            reason,
            on: self.clock.today(),
        };
        self.events.publish(HotelEvent::deactivated(event.clone()));
        self.reconciler.handle(&event).await
    }

    /// Load a reservation and lock its room, plus `extra_room` when given.
    /// Retries if the reservation moved rooms while we waited for the lock.
    async fn lock_reservation(
        &self,
        id: Uuid,
        extra_room: Option<Uuid>,
    ) -> CoreResult<(Reservation, Vec<OwnedMutexGuard<()>>)> {
        loop {
            let seen = self.get(id).await?;
            let mut room_ids = vec![seen.room_id];
            room_ids.extend(extra_room);

            let guards = self.locks.lock_all(&room_ids).await;
            let current = self.get(id).await?;
            if current.room_id == seen.room_id {
                return Ok((current, guards));
            }
        }
    }
}
