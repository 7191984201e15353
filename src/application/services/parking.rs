//! Parking transaction coordinator: entry and exit flows
//!
//! The one place with cross-entity invariants. Consistency under concurrent
//! gate events comes from atomic per-entity operations (conditional slot
//! reserve, constrained session insert, conditional wallet debit) plus
//! explicit compensating actions, never from cross-entity transactions.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::ports::{Notification, Notifier};
use crate::application::services::wallet::{FareDebit, WalletService};
use crate::domain::models::normalize_plate;
use crate::domain::{
    DomainError, DomainResult, NewSession, ParkingLot, PaymentStatus, RepositoryProvider,
    VehicleType,
};

/// Directive for the gate hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum GateAction {
    #[serde(rename = "OPEN_ENTRY_GATE")]
    OpenEntryGate,
    #[serde(rename = "DENY_ENTRY")]
    DenyEntry,
    #[serde(rename = "OPEN_EXIT_GATE")]
    OpenExitGate,
    #[serde(rename = "DENY_EXIT")]
    DenyExit,
}

/// Payload of a granted entry
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntryGrant {
    pub slot_number: i32,
    pub session_id: String,
}

/// Payload of a granted exit
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExitSummary {
    pub slot_number: i32,
    pub duration_minutes: i64,
    pub fare: i64,
    pub payment_status: String,
}

/// Entry flow result. Denials are outcomes, not errors; callers branch on
/// `action`, never on the message text.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntryOutcome {
    pub success: bool,
    pub message: String,
    pub action: GateAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<EntryGrant>,
}

impl EntryOutcome {
    fn granted(grant: EntryGrant) -> Self {
        Self {
            success: true,
            message: "Entry allowed".to_string(),
            action: GateAction::OpenEntryGate,
            data: Some(grant),
        }
    }

    fn denied(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            action: GateAction::DenyEntry,
            data: None,
        }
    }
}

/// Exit flow result
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExitOutcome {
    pub success: bool,
    pub message: String,
    pub action: GateAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ExitSummary>,
}

impl ExitOutcome {
    fn granted(summary: ExitSummary) -> Self {
        Self {
            success: true,
            message: "Exit allowed".to_string(),
            action: GateAction::OpenExitGate,
            data: Some(summary),
        }
    }

    fn denied(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            action: GateAction::DenyExit,
            data: None,
        }
    }
}

pub struct ParkingService {
    repos: Arc<dyn RepositoryProvider>,
    wallet: Arc<WalletService>,
    notifier: Arc<dyn Notifier>,
}

impl ParkingService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        wallet: Arc<WalletService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            repos,
            wallet,
            notifier,
        }
    }

    /// Entry flow.
    ///
    /// Stages, each a possible short-circuit: normalize plate, pre-check for
    /// an active session (fast friendly denial; the hard guarantee is the
    /// insert constraint), reserve a slot, resolve the plate's owner, open
    /// the session. Losing the open race releases the reserved slot so it
    /// never strands Occupied.
    pub async fn handle_entry(
        &self,
        plate_number: &str,
        lot_id: &str,
        vehicle_type: Option<VehicleType>,
    ) -> DomainResult<EntryOutcome> {
        let plate = normalize_plate(plate_number);
        if plate.is_empty() {
            return Err(DomainError::Validation("plate_number is required".to_string()));
        }
        let vehicle_type = vehicle_type.unwrap_or_default();
        let lot = self.require_lot(lot_id).await?;
        if !lot.is_active {
            return Ok(EntryOutcome::denied("Parking lot is closed"));
        }

        if self.repos.sessions().find_active(&plate).await?.is_some() {
            debug!(plate, "entry denied, vehicle already inside");
            return Ok(EntryOutcome::denied("Vehicle already inside parking"));
        }

        let session_id = Uuid::new_v4().to_string();
        let Some(slot) = self
            .repos
            .slots()
            .reserve_first_available(&lot.id, vehicle_type, &session_id)
            .await?
        else {
            info!(plate, lot_id = %lot.id, ?vehicle_type, "entry denied, lot full");
            return Ok(EntryOutcome::denied("Parking is full"));
        };

        let user = self.repos.users().find_by_plate(&plate).await?;
        let user_id = user.as_ref().map(|u| u.id.clone());

        let session = NewSession {
            id: session_id,
            plate_number: plate.clone(),
            lot_id: lot.id.clone(),
            slot_number: slot.slot_number,
            user_id,
            entry_time: Utc::now(),
        };
        let session = match self.repos.sessions().open(session).await {
            Ok(s) => s,
            Err(DomainError::Conflict(_)) => {
                // lost the race between the pre-check and the insert;
                // the reserved slot must not stay occupied
                info!(plate, slot = slot.slot_number, "entry race lost, releasing slot");
                if let Err(e) = self.repos.slots().release(&lot.id, slot.slot_number).await {
                    warn!(
                        lot_id = %lot.id,
                        slot = slot.slot_number,
                        error = %e,
                        "compensating slot release failed"
                    );
                }
                return Ok(EntryOutcome::denied("Vehicle already inside parking"));
            }
            Err(e) => return Err(e),
        };

        if let Some(user) = user {
            self.notify(
                user.id,
                Notification::new(
                    "Vehicle parked",
                    format!("{} parked at {} slot {}", plate, lot.name, slot.slot_number),
                    json!({
                        "type": "entry",
                        "session_id": session.id,
                        "lot_id": lot.id,
                        "slot_number": slot.slot_number,
                    }),
                ),
            );
        }

        info!(plate, lot_id = %lot.id, slot = slot.slot_number, "entry granted");
        Ok(EntryOutcome::granted(EntryGrant {
            slot_number: slot.slot_number,
            session_id: session.id,
        }))
    }

    /// Exit flow.
    ///
    /// Closes the session (fare is computed first, it feeds the debit),
    /// attempts the wallet debit, then releases the slot. The release is
    /// always the last mutating step and is unconditional: a missed payment
    /// is recoverable, a slot stuck Occupied is not. Payment shortfall never
    /// blocks the gate.
    pub async fn handle_exit(&self, plate_number: &str, lot_id: &str) -> DomainResult<ExitOutcome> {
        let plate = normalize_plate(plate_number);
        if plate.is_empty() {
            return Err(DomainError::Validation("plate_number is required".to_string()));
        }
        let lot = self.require_lot(lot_id).await?;

        let Some(session) = self
            .repos
            .sessions()
            .find_active_in_lot(&plate, &lot.id)
            .await?
        else {
            debug!(plate, lot_id = %lot.id, "exit denied, no active session");
            return Ok(ExitOutcome::denied("No active parking session found"));
        };

        let exit_time = Utc::now();
        let fare = lot.pricing.compute_fare(session.entry_time, exit_time);

        let initial_status = match (&session.user_id, fare.fare) {
            (None, _) => PaymentStatus::NoUser,
            (Some(_), 0) => PaymentStatus::Paid,
            (Some(_), _) => PaymentStatus::Pending,
        };

        let closed = match self
            .repos
            .sessions()
            .close(
                &session.id,
                exit_time,
                fare.duration_minutes,
                fare.fare,
                initial_status,
            )
            .await
        {
            Ok(s) => s,
            // a concurrent exit closed it first
            Err(DomainError::NoActiveSession(_)) => {
                return Ok(ExitOutcome::denied("No active parking session found"));
            }
            Err(e) => return Err(e),
        };

        let payment_status = match (&closed.user_id, initial_status) {
            (Some(user_id), PaymentStatus::Pending) => {
                let status = match self.wallet.deduct_fare(user_id, fare.fare, &closed.id).await? {
                    FareDebit::Paid { .. } => PaymentStatus::Paid,
                    FareDebit::Insufficient => PaymentStatus::Unpaid,
                };
                self.repos
                    .sessions()
                    .set_payment_status(&closed.id, status)
                    .await?;
                status
            }
            (_, status) => status,
        };

        self.repos.slots().release(&lot.id, closed.slot_number).await?;

        if let Some(user_id) = closed.user_id.clone() {
            self.notify(
                user_id,
                Notification::new(
                    "Vehicle exited",
                    format!(
                        "{} exited {} after {} min. Fare: {} ({})",
                        plate,
                        lot.name,
                        fare.duration_minutes,
                        fare.fare,
                        payment_status.as_str()
                    ),
                    json!({
                        "type": "exit",
                        "session_id": closed.id,
                        "fare": fare.fare,
                        "payment_status": payment_status.as_str(),
                    }),
                ),
            );
        }

        info!(
            plate,
            lot_id = %lot.id,
            slot = closed.slot_number,
            fare = fare.fare,
            payment_status = payment_status.as_str(),
            "exit granted"
        );
        Ok(ExitOutcome::granted(ExitSummary {
            slot_number: closed.slot_number,
            duration_minutes: fare.duration_minutes,
            fare: fare.fare,
            payment_status: payment_status.as_str().to_string(),
        }))
    }

    async fn require_lot(&self, lot_id: &str) -> DomainResult<ParkingLot> {
        self.repos
            .lots()
            .find_by_id(lot_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "ParkingLot",
                field: "id",
                value: lot_id.to_string(),
            })
    }

    /// Detached push delivery; never delays or fails the gate response.
    fn notify(&self, user_id: String, notification: Notification) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if !notifier.notify(&user_id, notification).await {
                debug!(user_id, "gate notification not delivered");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NoopNotifier;
    use crate::domain::models::{ParkingLot, ParkingSession, Pricing, SlotStatus, User};
    use crate::domain::repositories::{
        AdminRepository, LotRepository, SessionCounters, SessionFilter, SessionRepository,
        SlotRepository, UserRepository, WalletRepository,
    };
    use crate::infrastructure::memory::InMemoryRepositories;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration};

    async fn seed_lot(repos: &InMemoryRepositories, id: &str, slots: i32) -> ParkingLot {
        let lot = ParkingLot {
            id: id.to_string(),
            name: format!("Lot {}", id),
            code: format!("LOT-{}", id),
            total_slots: slots,
            pricing: Pricing {
                rate_per_hour: 60,
                free_minutes: 15,
            },
            address: None,
            latitude: None,
            longitude: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let lot = repos.lots().create(lot).await.unwrap();
        repos
            .slots()
            .bulk_create(id, slots, VehicleType::Car)
            .await
            .unwrap();
        lot
    }

    async fn seed_user(repos: &InMemoryRepositories, id: &str, plate: &str) -> User {
        let user = User {
            id: id.to_string(),
            name: "Test User".to_string(),
            email: format!("{}@example.com", id),
            phone: None,
            password_hash: "hash".to_string(),
            fcm_token: None,
            is_active: true,
            vehicle_plates: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let user = repos.users().create(user).await.unwrap();
        repos.users().link_plate(id, plate).await.unwrap();
        user
    }

    fn service(repos: Arc<InMemoryRepositories>) -> ParkingService {
        let notifier: Arc<dyn Notifier> = Arc::new(NoopNotifier);
        let wallet = Arc::new(WalletService::new(
            Arc::clone(&repos) as Arc<dyn RepositoryProvider>,
            Arc::clone(&notifier),
            50,
        ));
        ParkingService::new(repos, wallet, notifier)
    }

    #[tokio::test]
    async fn test_entry_grants_lowest_numbered_slot() {
        let repos = Arc::new(InMemoryRepositories::new());
        seed_lot(&repos, "l1", 3).await;
        let svc = service(Arc::clone(&repos));

        let outcome = svc.handle_entry("ka01ab1234", "l1", None).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.action, GateAction::OpenEntryGate);
        assert_eq!(outcome.data.unwrap().slot_number, 1);
    }

    #[tokio::test]
    async fn test_capacity_exhaustion_denies_next_entry() {
        let repos = Arc::new(InMemoryRepositories::new());
        seed_lot(&repos, "l1", 2).await;
        let svc = service(Arc::clone(&repos));

        for i in 0..2 {
            let outcome = svc
                .handle_entry(&format!("PLATE{}", i), "l1", None)
                .await
                .unwrap();
            assert!(outcome.success, "entry {} should be granted", i);
        }
        let outcome = svc.handle_entry("PLATE9", "l1", None).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.action, GateAction::DenyEntry);
        assert_eq!(outcome.message, "Parking is full");
    }

    #[tokio::test]
    async fn test_double_entry_denied_regardless_of_lot() {
        let repos = Arc::new(InMemoryRepositories::new());
        seed_lot(&repos, "l1", 2).await;
        seed_lot(&repos, "l2", 2).await;
        let svc = service(Arc::clone(&repos));

        assert!(svc.handle_entry("KA01AB1234", "l1", None).await.unwrap().success);
        let again = svc.handle_entry(" ka01 ab 1234 ", "l2", None).await.unwrap();
        assert!(!again.success);
        assert_eq!(again.message, "Vehicle already inside parking");
    }

    #[tokio::test]
    async fn test_exit_without_session_denied_and_mutates_nothing() {
        let repos = Arc::new(InMemoryRepositories::new());
        seed_lot(&repos, "l1", 2).await;
        let svc = service(Arc::clone(&repos));

        let outcome = svc.handle_exit("KA01AB1234", "l1").await.unwrap();
        assert_eq!(outcome.action, GateAction::DenyExit);

        let slots = repos.slots().list_for_lot("l1").await.unwrap();
        assert!(slots.iter().all(|s| s.status == SlotStatus::Available));
    }

    #[tokio::test]
    async fn test_round_trip_releases_slot_and_closes_session() {
        let repos = Arc::new(InMemoryRepositories::new());
        seed_lot(&repos, "l1", 2).await;
        let svc = service(Arc::clone(&repos));

        svc.handle_entry("KA01AB1234", "l1", None).await.unwrap();
        let outcome = svc.handle_exit("KA01AB1234", "l1").await.unwrap();
        assert!(outcome.success);
        let summary = outcome.data.unwrap();
        // unregistered plate, nothing to debit
        assert_eq!(summary.payment_status, "NO_USER");

        let slots = repos.slots().list_for_lot("l1").await.unwrap();
        assert!(slots.iter().all(|s| s.status == SlotStatus::Available));
        assert!(slots.iter().all(|s| s.current_session_id.is_none()));

        let (sessions, total) = repos
            .sessions()
            .list(Default::default(), 1, 10)
            .await
            .unwrap();
        assert_eq!(total, 1);
        let s = &sessions[0];
        assert_eq!(s.status.as_str(), "OUT");
        assert!(s.exit_time.is_some());
        assert!(s.duration_minutes.is_some());
    }

    #[tokio::test]
    async fn test_exit_within_free_window_is_paid_without_wallet_touch() {
        let repos = Arc::new(InMemoryRepositories::new());
        seed_lot(&repos, "l1", 2).await;
        seed_user(&repos, "u1", "KA01AB1234").await;
        let svc = service(Arc::clone(&repos));

        svc.handle_entry("KA01AB1234", "l1", None).await.unwrap();
        let outcome = svc.handle_exit("KA01AB1234", "l1").await.unwrap();
        let summary = outcome.data.unwrap();
        assert_eq!(summary.fare, 0);
        assert_eq!(summary.payment_status, "PAID");
        // wallet was never created
        assert!(repos.wallets().find("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insufficient_funds_marks_unpaid_but_opens_gate() {
        let repos = Arc::new(InMemoryRepositories::new());
        seed_lot(&repos, "l1", 2).await;
        seed_user(&repos, "u1", "KA01AB1234").await;
        let svc = service(Arc::clone(&repos));

        svc.handle_entry("KA01AB1234", "l1", None).await.unwrap();
        // backdate the entry so the stay is billable
        repos.backdate_active_session("KA01AB1234", Duration::minutes(90));

        let outcome = svc.handle_exit("KA01AB1234", "l1").await.unwrap();
        assert!(outcome.success, "exit must not be blocked by payment");
        let summary = outcome.data.unwrap();
        assert_eq!(summary.duration_minutes, 90);
        assert_eq!(summary.fare, 75);
        assert_eq!(summary.payment_status, "UNPAID");
        assert_eq!(repos.wallets().get_or_create("u1").await.unwrap().balance, 0);
    }

    #[tokio::test]
    async fn test_sufficient_funds_debits_fare() {
        let repos = Arc::new(InMemoryRepositories::new());
        seed_lot(&repos, "l1", 2).await;
        seed_user(&repos, "u1", "KA01AB1234").await;
        repos
            .wallets()
            .credit("u1", 500, "Wallet top-up", None)
            .await
            .unwrap();
        let svc = service(Arc::clone(&repos));

        svc.handle_entry("KA01AB1234", "l1", None).await.unwrap();
        repos.backdate_active_session("KA01AB1234", Duration::minutes(90));

        let outcome = svc.handle_exit("KA01AB1234", "l1").await.unwrap();
        let summary = outcome.data.unwrap();
        assert_eq!(summary.payment_status, "PAID");
        assert_eq!(repos.wallets().find("u1").await.unwrap().unwrap().balance, 425);

        let closed = repos
            .sessions()
            .find_by_id(&repos.last_session_id("KA01AB1234").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(closed.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_entries_fill_lot_exactly_once() {
        let repos = Arc::new(InMemoryRepositories::new());
        seed_lot(&repos, "l1", 5).await;
        let svc = Arc::new(service(Arc::clone(&repos)));

        let mut handles = Vec::new();
        for i in 0..12 {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move {
                svc.handle_entry(&format!("PLATE{}", i), "l1", None).await.unwrap()
            }));
        }

        let mut granted_slots = Vec::new();
        for h in handles {
            let outcome = h.await.unwrap();
            if outcome.success {
                granted_slots.push(outcome.data.unwrap().slot_number);
            }
        }

        assert_eq!(granted_slots.len(), 5);
        granted_slots.sort_unstable();
        granted_slots.dedup();
        assert_eq!(granted_slots.len(), 5, "a slot was double-assigned");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_same_plate_entries_leave_one_occupied_slot() {
        let repos = Arc::new(InMemoryRepositories::new());
        seed_lot(&repos, "l1", 5).await;
        let svc = Arc::new(service(Arc::clone(&repos)));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move {
                svc.handle_entry("KA01AB1234", "l1", None).await.unwrap()
            }));
        }
        let successes = {
            let mut n = 0;
            for h in handles {
                if h.await.unwrap().success {
                    n += 1;
                }
            }
            n
        };
        assert_eq!(successes, 1);

        // every loser released its reservation, win or lose the pre-check
        let occupied = repos
            .slots()
            .list_for_lot("l1")
            .await
            .unwrap()
            .into_iter()
            .filter(|s| s.status == SlotStatus::Occupied)
            .count();
        assert_eq!(occupied, 1);
    }

    /// Session store whose per-plate lookup always reads a stale miss,
    /// so every entry runs into the insert constraint instead of the
    /// friendly pre-check denial.
    struct StaleReadSessions {
        inner: Arc<InMemoryRepositories>,
    }

    #[async_trait]
    impl SessionRepository for StaleReadSessions {
        async fn open(&self, session: NewSession) -> DomainResult<ParkingSession> {
            self.inner.sessions().open(session).await
        }

        async fn find_by_id(&self, id: &str) -> DomainResult<Option<ParkingSession>> {
            self.inner.sessions().find_by_id(id).await
        }

        async fn find_active(&self, _plate_number: &str) -> DomainResult<Option<ParkingSession>> {
            Ok(None)
        }

        async fn find_active_in_lot(
            &self,
            plate_number: &str,
            lot_id: &str,
        ) -> DomainResult<Option<ParkingSession>> {
            self.inner.sessions().find_active_in_lot(plate_number, lot_id).await
        }

        async fn find_active_by_slot(
            &self,
            lot_id: &str,
            slot_number: i32,
        ) -> DomainResult<Option<ParkingSession>> {
            self.inner.sessions().find_active_by_slot(lot_id, slot_number).await
        }

        async fn close(
            &self,
            session_id: &str,
            exit_time: DateTime<Utc>,
            duration_minutes: i64,
            fare: i64,
            payment_status: PaymentStatus,
        ) -> DomainResult<ParkingSession> {
            self.inner
                .sessions()
                .close(session_id, exit_time, duration_minutes, fare, payment_status)
                .await
        }

        async fn set_payment_status(
            &self,
            session_id: &str,
            status: PaymentStatus,
        ) -> DomainResult<()> {
            self.inner.sessions().set_payment_status(session_id, status).await
        }

        async fn list(
            &self,
            filter: SessionFilter,
            page: u64,
            limit: u64,
        ) -> DomainResult<(Vec<ParkingSession>, u64)> {
            self.inner.sessions().list(filter, page, limit).await
        }

        async fn find_active_for_plates(
            &self,
            plates: &[String],
        ) -> DomainResult<Vec<ParkingSession>> {
            self.inner.sessions().find_active_for_plates(plates).await
        }

        async fn list_for_plates(
            &self,
            plates: &[String],
            page: u64,
            limit: u64,
        ) -> DomainResult<(Vec<ParkingSession>, u64)> {
            self.inner.sessions().list_for_plates(plates, page, limit).await
        }

        async fn counters(&self, since: DateTime<Utc>) -> DomainResult<SessionCounters> {
            self.inner.sessions().counters(since).await
        }
    }

    struct StaleReadProvider {
        inner: Arc<InMemoryRepositories>,
        sessions: StaleReadSessions,
    }

    impl StaleReadProvider {
        fn new(inner: Arc<InMemoryRepositories>) -> Self {
            Self {
                sessions: StaleReadSessions {
                    inner: Arc::clone(&inner),
                },
                inner,
            }
        }
    }

    impl RepositoryProvider for StaleReadProvider {
        fn slots(&self) -> &dyn SlotRepository {
            self.inner.slots()
        }

        fn sessions(&self) -> &dyn SessionRepository {
            &self.sessions
        }

        fn wallets(&self) -> &dyn WalletRepository {
            self.inner.wallets()
        }

        fn lots(&self) -> &dyn LotRepository {
            self.inner.lots()
        }

        fn users(&self) -> &dyn UserRepository {
            self.inner.users()
        }

        fn admins(&self) -> &dyn AdminRepository {
            self.inner.admins()
        }
    }

    #[tokio::test]
    async fn test_lost_open_race_releases_reserved_slot() {
        let store = Arc::new(InMemoryRepositories::new());
        seed_lot(&store, "l1", 2).await;

        // the plate is already inside, invisible to the stale pre-check
        store
            .sessions()
            .open(NewSession {
                id: "existing".to_string(),
                plate_number: "KA01AB1234".to_string(),
                lot_id: "l1".to_string(),
                slot_number: 1,
                user_id: None,
                entry_time: Utc::now(),
            })
            .await
            .unwrap();

        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(StaleReadProvider::new(Arc::clone(&store)));
        let notifier: Arc<dyn Notifier> = Arc::new(NoopNotifier);
        let wallet = Arc::new(WalletService::new(
            Arc::clone(&repos),
            Arc::clone(&notifier),
            50,
        ));
        let svc = ParkingService::new(repos, wallet, notifier);

        let outcome = svc.handle_entry("KA01AB1234", "l1", None).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.action, GateAction::DenyEntry);
        assert_eq!(outcome.message, "Vehicle already inside parking");

        // the reservation taken before the failed insert was rolled back
        let slots = store.slots().list_for_lot("l1").await.unwrap();
        assert!(slots.iter().all(|s| s.status == SlotStatus::Available));
        assert!(slots.iter().all(|s| s.current_session_id.is_none()));
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let repos = Arc::new(InMemoryRepositories::new());
        seed_lot(&repos, "l1", 1).await;
        let svc = service(Arc::clone(&repos));

        svc.handle_entry("KA01AB1234", "l1", None).await.unwrap();
        repos.slots().release("l1", 1).await.unwrap();
        repos.slots().release("l1", 1).await.unwrap();
        // releasing a slot that never existed is tolerated too
        repos.slots().release("l1", 99).await.unwrap();

        let slots = repos.slots().list_for_lot("l1").await.unwrap();
        assert_eq!(slots[0].status, SlotStatus::Available);
    }

    #[tokio::test]
    async fn test_entry_to_unknown_lot_is_not_found() {
        let repos = Arc::new(InMemoryRepositories::new());
        let svc = service(Arc::clone(&repos));
        let err = svc.handle_entry("KA01AB1234", "nope", None).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_blank_plate_is_validation_error() {
        let repos = Arc::new(InMemoryRepositories::new());
        seed_lot(&repos, "l1", 1).await;
        let svc = service(Arc::clone(&repos));
        let err = svc.handle_entry("   ", "l1", None).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_inactive_lot_denies_entry() {
        let repos = Arc::new(InMemoryRepositories::new());
        seed_lot(&repos, "l1", 2).await;
        repos.lots().set_active("l1", false).await.unwrap();
        let svc = service(Arc::clone(&repos));

        let outcome = svc.handle_entry("KA01AB1234", "l1", None).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.action, GateAction::DenyEntry);
    }

    #[tokio::test]
    async fn test_bike_entry_only_takes_bike_slots() {
        let repos = Arc::new(InMemoryRepositories::new());
        let lot = seed_lot(&repos, "l1", 2).await;
        repos
            .slots()
            .bulk_create(&lot.id, 1, VehicleType::Bike)
            .await
            .unwrap();
        let svc = service(Arc::clone(&repos));

        let outcome = svc
            .handle_entry("BIKE01", "l1", Some(VehicleType::Bike))
            .await
            .unwrap();
        // bike slot was numbered after the two car slots
        assert_eq!(outcome.data.unwrap().slot_number, 3);

        let denied = svc
            .handle_entry("BIKE02", "l1", Some(VehicleType::Bike))
            .await
            .unwrap();
        assert!(!denied.success);
    }
}
