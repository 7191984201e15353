//! Parking lot repository trait

use async_trait::async_trait;

use crate::domain::error::DomainResult;
use crate::domain::models::ParkingLot;

/// Lot configuration. Read-only from the coordinator's point of view;
/// mutated only through admin endpoints.
#[async_trait]
pub trait LotRepository: Send + Sync {
    /// Insert a new lot. Duplicate codes are a Conflict.
    async fn create(&self, lot: ParkingLot) -> DomainResult<ParkingLot>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ParkingLot>>;

    /// All lots, or only active ones (the mobile app never sees closed lots).
    async fn list(&self, only_active: bool) -> DomainResult<Vec<ParkingLot>>;

    async fn set_active(&self, id: &str, active: bool) -> DomainResult<ParkingLot>;

    async fn count(&self) -> DomainResult<u64>;
}
