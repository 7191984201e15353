//! In-memory repositories backed by dashmap
//!
//! Used by the service test suites and for running the API without a
//! database. Per-key shard locks give the same conditional-update atomicity
//! the SQL layer provides (reserve, debit, open are all check-and-mutate
//! under one entry lock).

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::warn;

use crate::domain::{
    AdminRepository, AdminUser, DomainError, DomainResult, LotRepository, NewSession, ParkingLot,
    ParkingSession, PaymentStatus, RepositoryProvider, SessionCounters, SessionFilter,
    SessionRepository, SessionStatus, Slot, SlotCounts, SlotRepository, SlotStatus, User,
    UserRepository, VehicleType, Wallet, WalletRepository, WalletTransaction,
};

const PENDING_TOPUP: &str = "Wallet top-up (pending)";

#[derive(Default)]
pub struct InMemoryRepositories {
    lots: DashMap<String, ParkingLot>,
    /// Keyed by (lot_id, slot_number)
    slots: DashMap<(String, i32), Slot>,
    slot_seq: AtomicI32,
    /// Guards bulk slot numbering
    bulk_lock: Mutex<()>,
    sessions: DashMap<String, ParkingSession>,
    /// plate -> open session id; the one-active-session-per-plate constraint
    active_by_plate: DashMap<String, String>,
    wallets: DashMap<String, Wallet>,
    wallet_seq: AtomicI32,
    wallet_txns: DashMap<i32, WalletTransaction>,
    txn_seq: AtomicI32,
    users: DashMap<String, User>,
    /// plate -> user id; plates are globally unique
    plate_owner: DashMap<String, String>,
    admins: DashMap<String, AdminUser>,
}

impl InMemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_txn_id(&self) -> i32 {
        self.txn_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn push_txn(
        &self,
        wallet_id: i32,
        kind: crate::domain::TransactionKind,
        amount: i64,
        description: &str,
        reference: Option<&str>,
    ) -> WalletTransaction {
        let txn = WalletTransaction {
            id: self.next_txn_id(),
            wallet_id,
            kind,
            amount,
            description: description.to_string(),
            reference: reference.map(str::to_string),
            created_at: Utc::now(),
        };
        self.wallet_txns.insert(txn.id, txn.clone());
        txn
    }

    /// Shift an open session's entry time into the past (test clock control).
    #[cfg(test)]
    pub fn backdate_active_session(&self, plate: &str, by: chrono::Duration) {
        if let Some(id) = self.active_by_plate.get(plate).map(|e| e.value().clone()) {
            if let Some(mut s) = self.sessions.get_mut(&id) {
                s.entry_time -= by;
            }
        }
    }

    /// Most recent session id for a plate, open or closed.
    #[cfg(test)]
    pub fn last_session_id(&self, plate: &str) -> Option<String> {
        self.sessions
            .iter()
            .filter(|e| e.value().plate_number == plate)
            .max_by_key(|e| e.value().entry_time)
            .map(|e| e.value().id.clone())
    }
}

impl RepositoryProvider for InMemoryRepositories {
    fn slots(&self) -> &dyn SlotRepository {
        self
    }

    fn sessions(&self) -> &dyn SessionRepository {
        self
    }

    fn wallets(&self) -> &dyn WalletRepository {
        self
    }

    fn lots(&self) -> &dyn LotRepository {
        self
    }

    fn users(&self) -> &dyn UserRepository {
        self
    }

    fn admins(&self) -> &dyn AdminRepository {
        self
    }
}

// ── Slots ───────────────────────────────────────────────────────

#[async_trait]
impl SlotRepository for InMemoryRepositories {
    async fn reserve_first_available(
        &self,
        lot_id: &str,
        vehicle_type: VehicleType,
        session_id: &str,
    ) -> DomainResult<Option<Slot>> {
        let mut candidates: Vec<i32> = self
            .slots
            .iter()
            .filter(|e| {
                let s = e.value();
                s.lot_id == lot_id
                    && s.vehicle_type == vehicle_type
                    && s.status == SlotStatus::Available
            })
            .map(|e| e.value().slot_number)
            .collect();
        candidates.sort_unstable();

        for slot_number in candidates {
            let key = (lot_id.to_string(), slot_number);
            if let Some(mut slot) = self.slots.get_mut(&key) {
                // re-check under the entry lock; a concurrent caller may
                // have taken this one since the scan
                if slot.status == SlotStatus::Available {
                    slot.status = SlotStatus::Occupied;
                    slot.current_session_id = Some(session_id.to_string());
                    slot.updated_at = Utc::now();
                    return Ok(Some(slot.clone()));
                }
            }
        }
        Ok(None)
    }

    async fn release(&self, lot_id: &str, slot_number: i32) -> DomainResult<()> {
        let key = (lot_id.to_string(), slot_number);
        match self.slots.get_mut(&key) {
            Some(mut slot) => {
                if slot.status == SlotStatus::Occupied {
                    slot.status = SlotStatus::Available;
                    slot.current_session_id = None;
                    slot.updated_at = Utc::now();
                }
                Ok(())
            }
            None => {
                warn!(lot_id, slot_number, "release of unknown slot ignored");
                Ok(())
            }
        }
    }

    async fn bulk_create(
        &self,
        lot_id: &str,
        count: i32,
        vehicle_type: VehicleType,
    ) -> DomainResult<Vec<Slot>> {
        let _guard = self.bulk_lock.lock().unwrap();
        let start = self
            .slots
            .iter()
            .filter(|e| e.value().lot_id == lot_id)
            .map(|e| e.value().slot_number)
            .max()
            .unwrap_or(0);

        let now = Utc::now();
        let mut created = Vec::with_capacity(count as usize);
        for i in 1..=count {
            let slot = Slot {
                id: self.slot_seq.fetch_add(1, Ordering::SeqCst) + 1,
                lot_id: lot_id.to_string(),
                slot_number: start + i,
                status: SlotStatus::Available,
                vehicle_type,
                current_session_id: None,
                created_at: now,
                updated_at: now,
            };
            self.slots
                .insert((lot_id.to_string(), slot.slot_number), slot.clone());
            created.push(slot);
        }
        Ok(created)
    }

    async fn list_for_lot(&self, lot_id: &str) -> DomainResult<Vec<Slot>> {
        let mut slots: Vec<Slot> = self
            .slots
            .iter()
            .filter(|e| e.value().lot_id == lot_id)
            .map(|e| e.value().clone())
            .collect();
        slots.sort_by_key(|s| s.slot_number);
        Ok(slots)
    }

    async fn count_available_for_lot(
        &self,
        lot_id: &str,
        vehicle_type: Option<VehicleType>,
    ) -> DomainResult<u64> {
        Ok(self
            .slots
            .iter()
            .filter(|e| {
                let s = e.value();
                s.lot_id == lot_id
                    && s.status == SlotStatus::Available
                    && vehicle_type.map_or(true, |vt| s.vehicle_type == vt)
            })
            .count() as u64)
    }

    async fn count_for_lot(&self, lot_id: &str) -> DomainResult<u64> {
        Ok(self
            .slots
            .iter()
            .filter(|e| e.value().lot_id == lot_id)
            .count() as u64)
    }

    async fn counts(&self) -> DomainResult<SlotCounts> {
        let mut counts = SlotCounts::default();
        for e in self.slots.iter() {
            counts.total += 1;
            if e.value().status == SlotStatus::Occupied {
                counts.occupied += 1;
            }
        }
        Ok(counts)
    }
}

// ── Sessions ────────────────────────────────────────────────────

#[async_trait]
impl SessionRepository for InMemoryRepositories {
    async fn open(&self, session: NewSession) -> DomainResult<ParkingSession> {
        match self.active_by_plate.entry(session.plate_number.clone()) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!(
                "active session exists for plate {}",
                session.plate_number
            ))),
            Entry::Vacant(vacant) => {
                let now = Utc::now();
                let record = ParkingSession {
                    id: session.id.clone(),
                    plate_number: session.plate_number,
                    lot_id: session.lot_id,
                    slot_number: session.slot_number,
                    user_id: session.user_id,
                    entry_time: session.entry_time,
                    exit_time: None,
                    duration_minutes: None,
                    fare: 0,
                    payment_status: PaymentStatus::Pending,
                    status: SessionStatus::In,
                    created_at: now,
                    updated_at: now,
                };
                vacant.insert(session.id);
                self.sessions.insert(record.id.clone(), record.clone());
                Ok(record)
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ParkingSession>> {
        Ok(self.sessions.get(id).map(|e| e.value().clone()))
    }

    async fn find_active(&self, plate_number: &str) -> DomainResult<Option<ParkingSession>> {
        let Some(id) = self
            .active_by_plate
            .get(plate_number)
            .map(|e| e.value().clone())
        else {
            return Ok(None);
        };
        Ok(self.sessions.get(&id).map(|e| e.value().clone()))
    }

    async fn find_active_in_lot(
        &self,
        plate_number: &str,
        lot_id: &str,
    ) -> DomainResult<Option<ParkingSession>> {
        Ok(self
            .find_active(plate_number)
            .await?
            .filter(|s| s.lot_id == lot_id))
    }

    async fn find_active_by_slot(
        &self,
        lot_id: &str,
        slot_number: i32,
    ) -> DomainResult<Option<ParkingSession>> {
        Ok(self
            .sessions
            .iter()
            .find(|e| {
                let s = e.value();
                s.status == SessionStatus::In && s.lot_id == lot_id && s.slot_number == slot_number
            })
            .map(|e| e.value().clone()))
    }

    async fn close(
        &self,
        session_id: &str,
        exit_time: DateTime<Utc>,
        duration_minutes: i64,
        fare: i64,
        payment_status: PaymentStatus,
    ) -> DomainResult<ParkingSession> {
        let closed = {
            let Some(mut session) = self.sessions.get_mut(session_id) else {
                return Err(DomainError::NoActiveSession(session_id.to_string()));
            };
            if session.status != SessionStatus::In {
                return Err(DomainError::NoActiveSession(session.plate_number.clone()));
            }
            session.status = SessionStatus::Out;
            session.exit_time = Some(exit_time);
            session.duration_minutes = Some(duration_minutes);
            session.fare = fare;
            session.payment_status = payment_status;
            session.updated_at = Utc::now();
            session.clone()
        };
        self.active_by_plate.remove(&closed.plate_number);
        Ok(closed)
    }

    async fn set_payment_status(
        &self,
        session_id: &str,
        status: PaymentStatus,
    ) -> DomainResult<()> {
        let Some(mut session) = self.sessions.get_mut(session_id) else {
            return Err(DomainError::NotFound {
                entity: "ParkingSession",
                field: "id",
                value: session_id.to_string(),
            });
        };
        session.payment_status = status;
        session.updated_at = Utc::now();
        Ok(())
    }

    async fn list(
        &self,
        filter: SessionFilter,
        page: u64,
        limit: u64,
    ) -> DomainResult<(Vec<ParkingSession>, u64)> {
        let mut matched: Vec<ParkingSession> = self
            .sessions
            .iter()
            .filter(|e| {
                let s = e.value();
                filter.status.map_or(true, |st| s.status == st)
                    && filter
                        .plate_number
                        .as_deref()
                        .map_or(true, |p| s.plate_number == p)
                    && filter.lot_id.as_deref().map_or(true, |l| s.lot_id == l)
            })
            .map(|e| e.value().clone())
            .collect();
        matched.sort_by(|a, b| b.entry_time.cmp(&a.entry_time));
        let total = matched.len() as u64;
        Ok((paginate(matched, page, limit), total))
    }

    async fn find_active_for_plates(
        &self,
        plates: &[String],
    ) -> DomainResult<Vec<ParkingSession>> {
        let mut active = Vec::new();
        for plate in plates {
            if let Some(s) = self.find_active(plate).await? {
                active.push(s);
            }
        }
        Ok(active)
    }

    async fn list_for_plates(
        &self,
        plates: &[String],
        page: u64,
        limit: u64,
    ) -> DomainResult<(Vec<ParkingSession>, u64)> {
        let mut matched: Vec<ParkingSession> = self
            .sessions
            .iter()
            .filter(|e| plates.contains(&e.value().plate_number))
            .map(|e| e.value().clone())
            .collect();
        matched.sort_by(|a, b| b.entry_time.cmp(&a.entry_time));
        let total = matched.len() as u64;
        Ok((paginate(matched, page, limit), total))
    }

    async fn counters(&self, since: DateTime<Utc>) -> DomainResult<SessionCounters> {
        let mut counters = SessionCounters::default();
        for e in self.sessions.iter() {
            let s = e.value();
            if s.status == SessionStatus::In {
                counters.active += 1;
            }
            if s.entry_time >= since {
                counters.entries_since += 1;
            }
            if let Some(exit) = s.exit_time {
                if exit >= since {
                    counters.exits_since += 1;
                    counters.revenue_since += s.fare;
                }
            }
        }
        Ok(counters)
    }
}

fn paginate<T>(items: Vec<T>, page: u64, limit: u64) -> Vec<T> {
    let page = page.max(1);
    items
        .into_iter()
        .skip(((page - 1) * limit) as usize)
        .take(limit as usize)
        .collect()
}

// ── Wallets ─────────────────────────────────────────────────────

#[async_trait]
impl WalletRepository for InMemoryRepositories {
    async fn find(&self, user_id: &str) -> DomainResult<Option<Wallet>> {
        Ok(self.wallets.get(user_id).map(|e| e.value().clone()))
    }

    async fn get_or_create(&self, user_id: &str) -> DomainResult<Wallet> {
        let wallet = self
            .wallets
            .entry(user_id.to_string())
            .or_insert_with(|| {
                let now = Utc::now();
                Wallet {
                    id: self.wallet_seq.fetch_add(1, Ordering::SeqCst) + 1,
                    user_id: user_id.to_string(),
                    balance: 0,
                    created_at: now,
                    updated_at: now,
                }
            })
            .clone();
        Ok(wallet)
    }

    async fn credit(
        &self,
        user_id: &str,
        amount: i64,
        description: &str,
        reference: Option<&str>,
    ) -> DomainResult<Wallet> {
        self.get_or_create(user_id).await?;
        let Some(mut wallet) = self.wallets.get_mut(user_id) else {
            return Err(DomainError::Database("wallet vanished after create".into()));
        };
        wallet.balance += amount;
        wallet.updated_at = Utc::now();
        self.push_txn(
            wallet.id,
            crate::domain::TransactionKind::Credit,
            amount,
            description,
            reference,
        );
        Ok(wallet.clone())
    }

    async fn debit_if_sufficient(
        &self,
        user_id: &str,
        amount: i64,
        description: &str,
        reference: Option<&str>,
    ) -> DomainResult<Wallet> {
        self.get_or_create(user_id).await?;
        let Some(mut wallet) = self.wallets.get_mut(user_id) else {
            return Err(DomainError::Database("wallet vanished after create".into()));
        };
        // balance check and decrement happen under one entry lock
        if wallet.balance < amount {
            return Err(DomainError::InsufficientFunds);
        }
        wallet.balance -= amount;
        wallet.updated_at = Utc::now();
        self.push_txn(
            wallet.id,
            crate::domain::TransactionKind::Debit,
            amount,
            description,
            reference,
        );
        Ok(wallet.clone())
    }

    async fn transactions(
        &self,
        wallet_id: i32,
        limit: u64,
    ) -> DomainResult<Vec<WalletTransaction>> {
        let mut txns: Vec<WalletTransaction> = self
            .wallet_txns
            .iter()
            .filter(|e| e.value().wallet_id == wallet_id)
            .map(|e| e.value().clone())
            .collect();
        txns.sort_by(|a, b| b.id.cmp(&a.id));
        txns.truncate(limit as usize);
        Ok(txns)
    }

    async fn record_pending_topup(
        &self,
        user_id: &str,
        amount: i64,
    ) -> DomainResult<WalletTransaction> {
        let wallet = self.get_or_create(user_id).await?;
        Ok(self.push_txn(
            wallet.id,
            crate::domain::TransactionKind::Credit,
            amount,
            PENDING_TOPUP,
            None,
        ))
    }

    async fn confirm_topup(
        &self,
        user_id: &str,
        transaction_id: i32,
        payment_ref: &str,
    ) -> DomainResult<Wallet> {
        let wallet = self.get_or_create(user_id).await?;
        let amount = {
            let Some(mut txn) = self.wallet_txns.get_mut(&transaction_id) else {
                return Err(DomainError::NotFound {
                    entity: "WalletTransaction",
                    field: "id",
                    value: transaction_id.to_string(),
                });
            };
            if txn.wallet_id != wallet.id {
                return Err(DomainError::NotFound {
                    entity: "WalletTransaction",
                    field: "id",
                    value: transaction_id.to_string(),
                });
            }
            if txn.description != PENDING_TOPUP {
                return Err(DomainError::Conflict(format!(
                    "top-up {} already settled",
                    transaction_id
                )));
            }
            txn.description = "Wallet top-up".to_string();
            txn.reference = Some(payment_ref.to_string());
            txn.amount
        };
        let Some(mut wallet) = self.wallets.get_mut(user_id) else {
            return Err(DomainError::Database("wallet vanished after settle".into()));
        };
        wallet.balance += amount;
        wallet.updated_at = Utc::now();
        Ok(wallet.clone())
    }
}

// ── Lots ────────────────────────────────────────────────────────

#[async_trait]
impl LotRepository for InMemoryRepositories {
    async fn create(&self, lot: ParkingLot) -> DomainResult<ParkingLot> {
        if self.lots.iter().any(|e| e.value().code == lot.code) {
            return Err(DomainError::Conflict(format!(
                "lot code {} already exists",
                lot.code
            )));
        }
        self.lots.insert(lot.id.clone(), lot.clone());
        Ok(lot)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ParkingLot>> {
        Ok(self.lots.get(id).map(|e| e.value().clone()))
    }

    async fn list(&self, only_active: bool) -> DomainResult<Vec<ParkingLot>> {
        let mut lots: Vec<ParkingLot> = self
            .lots
            .iter()
            .filter(|e| !only_active || e.value().is_active)
            .map(|e| e.value().clone())
            .collect();
        lots.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(lots)
    }

    async fn set_active(&self, id: &str, active: bool) -> DomainResult<ParkingLot> {
        let Some(mut lot) = self.lots.get_mut(id) else {
            return Err(DomainError::NotFound {
                entity: "ParkingLot",
                field: "id",
                value: id.to_string(),
            });
        };
        lot.is_active = active;
        lot.updated_at = Utc::now();
        Ok(lot.clone())
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.lots.len() as u64)
    }
}

// ── Users ───────────────────────────────────────────────────────

#[async_trait]
impl UserRepository for InMemoryRepositories {
    async fn create(&self, user: User) -> DomainResult<User> {
        if self.users.iter().any(|e| e.value().email == user.email) {
            return Err(DomainError::Conflict(format!(
                "email {} already registered",
                user.email
            )));
        }
        if let Some(phone) = &user.phone {
            if self
                .users
                .iter()
                .any(|e| e.value().phone.as_deref() == Some(phone.as_str()))
            {
                return Err(DomainError::Conflict(format!(
                    "phone {} already registered",
                    phone
                )));
            }
        }
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|e| e.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|e| e.value().email == email)
            .map(|e| e.value().clone()))
    }

    async fn find_by_plate(&self, plate_number: &str) -> DomainResult<Option<User>> {
        let Some(owner) = self.plate_owner.get(plate_number).map(|e| e.value().clone()) else {
            return Ok(None);
        };
        Ok(self.users.get(&owner).map(|e| e.value().clone()))
    }

    async fn link_plate(&self, user_id: &str, plate_number: &str) -> DomainResult<Vec<String>> {
        match self.plate_owner.entry(plate_number.to_string()) {
            Entry::Occupied(_) => {
                return Err(DomainError::Conflict(format!(
                    "plate {} already linked to a user",
                    plate_number
                )))
            }
            Entry::Vacant(vacant) => {
                vacant.insert(user_id.to_string());
            }
        }
        let Some(mut user) = self.users.get_mut(user_id) else {
            self.plate_owner.remove(plate_number);
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: user_id.to_string(),
            });
        };
        user.vehicle_plates.push(plate_number.to_string());
        user.updated_at = Utc::now();
        Ok(user.vehicle_plates.clone())
    }

    async fn unlink_plate(&self, user_id: &str, plate_number: &str) -> DomainResult<Vec<String>> {
        let owned = self
            .plate_owner
            .get(plate_number)
            .map(|e| e.value() == user_id)
            .unwrap_or(false);
        if !owned {
            return Err(DomainError::NotFound {
                entity: "Vehicle",
                field: "plate_number",
                value: plate_number.to_string(),
            });
        }
        self.plate_owner.remove(plate_number);
        let Some(mut user) = self.users.get_mut(user_id) else {
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: user_id.to_string(),
            });
        };
        user.vehicle_plates.retain(|p| p != plate_number);
        user.updated_at = Utc::now();
        Ok(user.vehicle_plates.clone())
    }

    async fn set_fcm_token(&self, user_id: &str, token: Option<String>) -> DomainResult<()> {
        let Some(mut user) = self.users.get_mut(user_id) else {
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: user_id.to_string(),
            });
        };
        user.fcm_token = token;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn clear_fcm_token_by_value(&self, token: &str) -> DomainResult<()> {
        for mut e in self.users.iter_mut() {
            if e.value().fcm_token.as_deref() == Some(token) {
                e.value_mut().fcm_token = None;
            }
        }
        Ok(())
    }
}

// ── Admins ──────────────────────────────────────────────────────

#[async_trait]
impl AdminRepository for InMemoryRepositories {
    async fn create(&self, admin: AdminUser) -> DomainResult<AdminUser> {
        if self
            .admins
            .iter()
            .any(|e| e.value().username == admin.username)
        {
            return Err(DomainError::Conflict(format!(
                "username {} already exists",
                admin.username
            )));
        }
        self.admins.insert(admin.id.clone(), admin.clone());
        Ok(admin)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<AdminUser>> {
        Ok(self.admins.get(id).map(|e| e.value().clone()))
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<AdminUser>> {
        Ok(self
            .admins
            .iter()
            .find(|e| e.value().username == username)
            .map(|e| e.value().clone()))
    }

    async fn touch_last_login(&self, id: &str) -> DomainResult<()> {
        if let Some(mut admin) = self.admins.get_mut(id) {
            admin.last_login_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.admins.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_rejects_second_active_session_for_plate() {
        let repos = InMemoryRepositories::new();
        let first = NewSession {
            id: "s1".to_string(),
            plate_number: "KA01AB1234".to_string(),
            lot_id: "l1".to_string(),
            slot_number: 1,
            user_id: None,
            entry_time: Utc::now(),
        };
        repos.sessions().open(first.clone()).await.unwrap();

        let second = NewSession {
            id: "s2".to_string(),
            ..first
        };
        assert!(matches!(
            repos.sessions().open(second).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_close_then_reopen_same_plate() {
        let repos = InMemoryRepositories::new();
        let session = NewSession {
            id: "s1".to_string(),
            plate_number: "KA01AB1234".to_string(),
            lot_id: "l1".to_string(),
            slot_number: 1,
            user_id: None,
            entry_time: Utc::now(),
        };
        repos.sessions().open(session.clone()).await.unwrap();
        repos
            .sessions()
            .close("s1", Utc::now(), 10, 0, PaymentStatus::NoUser)
            .await
            .unwrap();

        // the plate is free again once its session is OUT
        let reopened = NewSession {
            id: "s2".to_string(),
            ..session
        };
        assert!(repos.sessions().open(reopened).await.is_ok());
    }

    #[tokio::test]
    async fn test_double_close_is_no_active_session() {
        let repos = InMemoryRepositories::new();
        repos
            .sessions()
            .open(NewSession {
                id: "s1".to_string(),
                plate_number: "KA01AB1234".to_string(),
                lot_id: "l1".to_string(),
                slot_number: 1,
                user_id: None,
                entry_time: Utc::now(),
            })
            .await
            .unwrap();
        repos
            .sessions()
            .close("s1", Utc::now(), 5, 0, PaymentStatus::NoUser)
            .await
            .unwrap();
        assert!(matches!(
            repos
                .sessions()
                .close("s1", Utc::now(), 5, 0, PaymentStatus::NoUser)
                .await,
            Err(DomainError::NoActiveSession(_))
        ));
    }

    #[tokio::test]
    async fn test_plate_linking_is_globally_unique() {
        let repos = InMemoryRepositories::new();
        for id in ["u1", "u2"] {
            repos
                .users()
                .create(User {
                    id: id.to_string(),
                    name: "U".to_string(),
                    email: format!("{}@example.com", id),
                    phone: None,
                    password_hash: "h".to_string(),
                    fcm_token: None,
                    is_active: true,
                    vehicle_plates: vec![],
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
                .await
                .unwrap();
        }
        repos.users().link_plate("u1", "KA01AB1234").await.unwrap();
        assert!(matches!(
            repos.users().link_plate("u2", "KA01AB1234").await,
            Err(DomainError::Conflict(_))
        ));

        let owner = repos.users().find_by_plate("KA01AB1234").await.unwrap();
        assert_eq!(owner.unwrap().id, "u1");
    }

    #[tokio::test]
    async fn test_bulk_create_numbers_on_from_max() {
        let repos = InMemoryRepositories::new();
        repos
            .slots()
            .bulk_create("l1", 3, VehicleType::Car)
            .await
            .unwrap();
        let bikes = repos
            .slots()
            .bulk_create("l1", 2, VehicleType::Bike)
            .await
            .unwrap();
        let numbers: Vec<i32> = bikes.iter().map(|s| s.slot_number).collect();
        assert_eq!(numbers, vec![4, 5]);
    }
}
