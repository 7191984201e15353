//! Parking domain DTOs shared across handlers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ParkingLot, ParkingSession, Slot, Wallet, WalletTransaction};

/// Parking lot with live occupancy
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LotDto {
    pub id: String,
    pub name: String,
    /// Short unique code used by gate hardware
    pub code: String,
    pub total_slots: i32,
    /// Fare per hour in minor currency units
    pub rate_per_hour: i64,
    /// Free parking window in minutes
    pub free_minutes: i64,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: bool,
    /// Slots currently free, any vehicle type
    pub available_slots: u64,
    /// Slots provisioned in storage (may lag `total_slots` until bulk create)
    pub created_slots: u64,
    pub created_at: DateTime<Utc>,
}

impl LotDto {
    pub fn from_domain(lot: ParkingLot, available: u64, created: u64) -> Self {
        Self {
            id: lot.id,
            name: lot.name,
            code: lot.code,
            total_slots: lot.total_slots,
            rate_per_hour: lot.pricing.rate_per_hour,
            free_minutes: lot.pricing.free_minutes,
            address: lot.address,
            latitude: lot.latitude,
            longitude: lot.longitude,
            is_active: lot.is_active,
            available_slots: available,
            created_slots: created,
            created_at: lot.created_at,
        }
    }
}

/// Single parking slot
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SlotDto {
    pub id: i32,
    pub lot_id: String,
    pub slot_number: i32,
    /// `Available`, `Occupied` or `Maintenance`
    pub status: String,
    /// `Car` or `Bike`
    pub vehicle_type: String,
    pub current_session_id: Option<String>,
}

impl From<Slot> for SlotDto {
    fn from(s: Slot) -> Self {
        Self {
            id: s.id,
            lot_id: s.lot_id,
            slot_number: s.slot_number,
            status: s.status.as_str().to_string(),
            vehicle_type: s.vehicle_type.as_str().to_string(),
            current_session_id: s.current_session_id,
        }
    }
}

/// Parking session
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionDto {
    pub id: String,
    pub plate_number: String,
    pub lot_id: String,
    pub slot_number: i32,
    pub user_id: Option<String>,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    /// Fare in minor currency units
    pub fare: i64,
    /// `PENDING`, `PAID`, `UNPAID` or `NO_USER`
    pub payment_status: String,
    /// `IN` while parked, `OUT` after exit
    pub status: String,
}

impl From<ParkingSession> for SessionDto {
    fn from(s: ParkingSession) -> Self {
        Self {
            id: s.id,
            plate_number: s.plate_number,
            lot_id: s.lot_id,
            slot_number: s.slot_number,
            user_id: s.user_id,
            entry_time: s.entry_time,
            exit_time: s.exit_time,
            duration_minutes: s.duration_minutes,
            fare: s.fare,
            payment_status: s.payment_status.as_str().to_string(),
            status: s.status.as_str().to_string(),
        }
    }
}

/// Wallet balance
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WalletDto {
    pub id: i32,
    /// Balance in minor currency units
    pub balance: i64,
}

impl From<Wallet> for WalletDto {
    fn from(w: Wallet) -> Self {
        Self {
            id: w.id,
            balance: w.balance,
        }
    }
}

/// Wallet ledger entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionDto {
    pub id: i32,
    /// `CREDIT` or `DEBIT`
    pub kind: String,
    pub amount: i64,
    pub description: String,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<WalletTransaction> for TransactionDto {
    fn from(t: WalletTransaction) -> Self {
        Self {
            id: t.id,
            kind: t.kind.as_str().to_string(),
            amount: t.amount,
            description: t.description,
            reference: t.reference,
            created_at: t.created_at,
        }
    }
}
