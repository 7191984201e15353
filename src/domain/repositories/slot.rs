//! Slot ledger repository trait

use async_trait::async_trait;

use crate::domain::error::DomainResult;
use crate::domain::models::{Slot, VehicleType};

/// Occupancy totals across all lots, for the dashboard
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotCounts {
    pub total: u64,
    pub occupied: u64,
}

/// Owns slot occupancy state.
///
/// `reserve_first_available` and `release` are the only mutation paths the
/// parking coordinator uses; both must be safe under concurrent callers.
#[async_trait]
pub trait SlotRepository: Send + Sync {
    /// Atomically reserve the free slot with the lowest slot number matching
    /// (lot, vehicle type), attaching the given session reference.
    ///
    /// The flip to Occupied is a conditional update filtered on the slot
    /// still being Available, so two concurrent callers can never both get
    /// the same slot. Returns `None` when the lot has no matching free slot.
    async fn reserve_first_available(
        &self,
        lot_id: &str,
        vehicle_type: VehicleType,
        session_id: &str,
    ) -> DomainResult<Option<Slot>>;

    /// Return a slot to Available and clear its session reference.
    ///
    /// Idempotent: releasing an already-free or missing slot logs and
    /// succeeds, so retries and compensating calls are always safe.
    async fn release(&self, lot_id: &str, slot_number: i32) -> DomainResult<()>;

    /// Create `count` new slots for a lot, numbering on from the current
    /// highest slot number.
    async fn bulk_create(
        &self,
        lot_id: &str,
        count: i32,
        vehicle_type: VehicleType,
    ) -> DomainResult<Vec<Slot>>;

    async fn list_for_lot(&self, lot_id: &str) -> DomainResult<Vec<Slot>>;

    async fn count_available_for_lot(
        &self,
        lot_id: &str,
        vehicle_type: Option<VehicleType>,
    ) -> DomainResult<u64>;

    async fn count_for_lot(&self, lot_id: &str) -> DomainResult<u64>;

    async fn counts(&self) -> DomainResult<SlotCounts>;
}
