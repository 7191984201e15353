//! Session store repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainResult;
use crate::domain::models::{NewSession, ParkingSession, PaymentStatus, SessionStatus};

/// Filters for the admin session list
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub status: Option<SessionStatus>,
    pub plate_number: Option<String>,
    pub lot_id: Option<String>,
}

/// Counters for the dashboard overview
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCounters {
    pub active: u64,
    pub entries_since: u64,
    pub exits_since: u64,
    /// Sum of fares on sessions closed since the cutoff
    pub revenue_since: i64,
}

/// Owns parking-session records and the one-active-session-per-plate rule.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a new IN session.
    ///
    /// Uniqueness of the active plate is a storage-layer constraint; a lost
    /// race surfaces as `DomainError::Conflict`, never as a duplicate row.
    async fn open(&self, session: NewSession) -> DomainResult<ParkingSession>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ParkingSession>>;

    async fn find_active(&self, plate_number: &str) -> DomainResult<Option<ParkingSession>>;

    async fn find_active_in_lot(
        &self,
        plate_number: &str,
        lot_id: &str,
    ) -> DomainResult<Option<ParkingSession>>;

    async fn find_active_by_slot(
        &self,
        lot_id: &str,
        slot_number: i32,
    ) -> DomainResult<Option<ParkingSession>>;

    /// Transition a session to OUT, recording exit time, duration and fare.
    ///
    /// Conditional on the session still being IN; a concurrent close wins
    /// the race and the loser gets `DomainError::NoActiveSession`.
    async fn close(
        &self,
        session_id: &str,
        exit_time: DateTime<Utc>,
        duration_minutes: i64,
        fare: i64,
        payment_status: PaymentStatus,
    ) -> DomainResult<ParkingSession>;

    /// Record the settlement outcome after the wallet debit was attempted.
    async fn set_payment_status(
        &self,
        session_id: &str,
        status: PaymentStatus,
    ) -> DomainResult<()>;

    /// Paginated list for the admin dashboard, newest first.
    async fn list(
        &self,
        filter: SessionFilter,
        page: u64,
        limit: u64,
    ) -> DomainResult<(Vec<ParkingSession>, u64)>;

    /// Active sessions across any of the given plates (mobile app view).
    async fn find_active_for_plates(
        &self,
        plates: &[String],
    ) -> DomainResult<Vec<ParkingSession>>;

    /// Paginated history across the given plates, newest first.
    async fn list_for_plates(
        &self,
        plates: &[String],
        page: u64,
        limit: u64,
    ) -> DomainResult<(Vec<ParkingSession>, u64)>;

    async fn counters(&self, since: DateTime<Utc>) -> DomainResult<SessionCounters>;
}
