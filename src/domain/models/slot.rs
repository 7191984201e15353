//! Parking slot entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Occupancy state of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotStatus {
    Available,
    Occupied,
    Maintenance,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Available => "Available",
            SlotStatus::Occupied => "Occupied",
            SlotStatus::Maintenance => "Maintenance",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Available" => Some(SlotStatus::Available),
            "Occupied" => Some(SlotStatus::Occupied),
            "Maintenance" => Some(SlotStatus::Maintenance),
            _ => None,
        }
    }
}

/// Vehicle category a slot accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleType {
    Car,
    Bike,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Car => "Car",
            VehicleType::Bike => "Bike",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Car" | "CAR" | "car" => Some(VehicleType::Car),
            "Bike" | "BIKE" | "bike" => Some(VehicleType::Bike),
            _ => None,
        }
    }
}

impl Default for VehicleType {
    fn default() -> Self {
        Self::Car
    }
}

/// A single parking slot. Identified by (lot_id, slot_number), unique together.
///
/// Invariant: `status == Occupied` exactly when `current_session_id` points
/// at an open session. Slots are created in bulk by admin action and flipped
/// between Available and Occupied only by the parking coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: i32,
    pub lot_id: String,
    pub slot_number: i32,
    pub status: SlotStatus,
    pub vehicle_type: VehicleType,
    pub current_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in [SlotStatus::Available, SlotStatus::Occupied, SlotStatus::Maintenance] {
            assert_eq!(SlotStatus::from_str(s.as_str()), Some(s));
        }
        assert_eq!(SlotStatus::from_str("Broken"), None);
    }

    #[test]
    fn test_vehicle_type_accepts_request_casing() {
        assert_eq!(VehicleType::from_str("CAR"), Some(VehicleType::Car));
        assert_eq!(VehicleType::from_str("bike"), Some(VehicleType::Bike));
        assert_eq!(VehicleType::from_str("truck"), None);
    }
}
