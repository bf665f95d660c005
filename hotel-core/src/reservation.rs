use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::guest::Guest;
use crate::room::{Room, RoomStatus, RoomType};
use crate::{CoreError, CoreResult};

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    #[default]
    Active,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Active => "ACTIVE",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::Completed => "COMPLETED",
        }
    }

    pub fn is_active(&self) -> bool {
        *self == ReservationStatus::Active
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Statuses that hold the room for their date range.
    pub fn blocks_inventory(&self) -> bool {
        matches!(self, ReservationStatus::Active | ReservationStatus::Completed)
    }

    /// The legal-transition table. ACTIVE may become CANCELLED or COMPLETED;
    /// CANCELLED and COMPLETED are terminal. Staying put is always allowed.
    pub fn transition(self, to: ReservationStatus) -> CoreResult<ReservationStatus> {
        use ReservationStatus::*;
        match (self, to) {
            (from, to) if from == to => Ok(to),
            (Active, Cancelled) | (Active, Completed) => Ok(to),
            (from, to) => Err(CoreError::State(format!(
                "Invalid reservation status transition from {} to {}.",
                from, to
            ))),
        }
    }
}

impl FromStr for ReservationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(ReservationStatus::Active),
            "CANCELLED" => Ok(ReservationStatus::Cancelled),
            "COMPLETED" => Ok(ReservationStatus::Completed),
            other => Err(CoreError::Validation(format!(
                "Unknown reservation status: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reservation {
    pub id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: ReservationStatus,
    pub room_id: Uuid,
    pub guest_id: Uuid,
}

impl Reservation {
    pub fn new(new: &NewReservation) -> Self {
        Self {
            id: Uuid::new_v4(),
            check_in: new.check_in,
            check_out: new.check_out,
            status: ReservationStatus::Active,
            room_id: new.room_id,
            guest_id: new.guest_id,
        }
    }

    /// Half-open overlap: a stay ending on the day another begins does not collide.
    pub fn overlaps(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        self.check_in < check_out && self.check_out > check_in
    }
}

pub fn validate_range(check_in: NaiveDate, check_out: NaiveDate) -> CoreResult<()> {
    if check_in >= check_out {
        return Err(CoreError::Validation(
            "Check-in date must be before check-out date.".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReservation {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub room_id: Uuid,
    pub guest_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationUpdate {
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub room_id: Option<Uuid>,
    pub guest_id: Option<Uuid>,
    pub status: Option<ReservationStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomSummary {
    pub id: Uuid,
    pub number: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub status: RoomStatus,
}

impl From<&Room> for RoomSummary {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id,
            number: room.number.clone(),
            room_type: room.room_type,
            status: room.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuestSummary {
    pub id: Uuid,
    pub name: String,
    pub document: String,
}

impl From<&Guest> for GuestSummary {
    fn from(guest: &Guest) -> Self {
        Self {
            id: guest.id,
            name: guest.name.clone(),
            document: guest.document.clone(),
        }
    }
}

/// A reservation as the read endpoints return it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReservationDetails {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub room: Option<RoomSummary>,
    pub guest: Option<GuestSummary>,
}
