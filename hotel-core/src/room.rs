use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

/// Room category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    Simple,
    Double,
    Suite,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Simple => "SIMPLE",
            RoomType::Double => "DOUBLE",
            RoomType::Suite => "SUITE",
        }
    }
}

impl FromStr for RoomType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SIMPLE" => Ok(RoomType::Simple),
            "DOUBLE" => Ok(RoomType::Double),
            "SUITE" => Ok(RoomType::Suite),
            other => Err(CoreError::Validation(format!("Unknown room type: {}", other))),
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Occupancy status of a room
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    #[default]
    Available,
    Occupied,
    Maintenance,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "AVAILABLE",
            RoomStatus::Occupied => "OCCUPIED",
            RoomStatus::Maintenance => "MAINTENANCE",
        }
    }

    /// Transition taken on check-in. Only an available room can be occupied.
    pub fn occupy(self) -> CoreResult<RoomStatus> {
        match self {
            RoomStatus::Available => Ok(RoomStatus::Occupied),
            RoomStatus::Occupied => Err(CoreError::State("The room is already occupied.".to_string())),
            RoomStatus::Maintenance => Err(CoreError::State(
                "Cannot check in to a room under maintenance.".to_string(),
            )),
        }
    }
}

impl FromStr for RoomStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(RoomStatus::Available),
            "OCCUPIED" => Ok(RoomStatus::Occupied),
            "MAINTENANCE" => Ok(RoomStatus::Maintenance),
            other => Err(CoreError::Validation(format!("Unknown room status: {}", other))),
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: Uuid,
    pub number: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub status: RoomStatus,
    pub nightly_rate: f64,
}

impl Room {
    pub fn new(new: NewRoom) -> CoreResult<Self> {
        let number = validate_number(&new.number)?;
        validate_rate(new.nightly_rate)?;

        Ok(Self {
            id: Uuid::new_v4(),
            number,
            room_type: new.room_type,
            status: new.status.unwrap_or_default(),
            nightly_rate: new.nightly_rate,
        })
    }

    /// Merge the provided fields over this room.
    pub fn apply(&mut self, update: RoomUpdate) -> CoreResult<()> {
        if let Some(number) = update.number {
            self.number = validate_number(&number)?;
        }
        if let Some(room_type) = update.room_type {
            self.room_type = room_type;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(rate) = update.nightly_rate {
            validate_rate(rate)?;
            self.nightly_rate = rate;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoom {
    pub number: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub status: Option<RoomStatus>,
    pub nightly_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomUpdate {
    pub number: Option<String>,
    #[serde(rename = "type")]
    pub room_type: Option<RoomType>,
    pub status: Option<RoomStatus>,
    pub nightly_rate: Option<f64>,
}

fn validate_number(number: &str) -> CoreResult<String> {
    let trimmed = number.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Room number is required.".to_string()));
    }
    Ok(trimmed.to_string())
}

fn validate_rate(rate: f64) -> CoreResult<()> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(CoreError::Validation(
            "Nightly rate must be a non-negative number.".to_string(),
        ));
    }
    Ok(())
}
