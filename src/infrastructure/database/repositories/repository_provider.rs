//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::repositories::RepositoryProvider;
use crate::domain::{
    AdminRepository, LotRepository, SessionRepository, SlotRepository, UserRepository,
    WalletRepository,
};

use super::lot_repository::SeaOrmLotRepository;
use super::session_repository::SeaOrmSessionRepository;
use super::slot_repository::SeaOrmSlotRepository;
use super::user_repository::{SeaOrmAdminRepository, SeaOrmUserRepository};
use super::wallet_repository::SeaOrmWalletRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let lot = repos.lots().find_by_id("lot-1").await?;
/// let session = repos.sessions().find_active("34ABC123").await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    lots: SeaOrmLotRepository,
    slots: SeaOrmSlotRepository,
    sessions: SeaOrmSessionRepository,
    wallets: SeaOrmWalletRepository,
    users: SeaOrmUserRepository,
    admins: SeaOrmAdminRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            lots: SeaOrmLotRepository::new(db.clone()),
            slots: SeaOrmSlotRepository::new(db.clone()),
            sessions: SeaOrmSessionRepository::new(db.clone()),
            wallets: SeaOrmWalletRepository::new(db.clone()),
            users: SeaOrmUserRepository::new(db.clone()),
            admins: SeaOrmAdminRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn lots(&self) -> &dyn LotRepository {
        &self.lots
    }

    fn slots(&self) -> &dyn SlotRepository {
        &self.slots
    }

    fn sessions(&self) -> &dyn SessionRepository {
        &self.sessions
    }

    fn wallets(&self) -> &dyn WalletRepository {
        &self.wallets
    }

    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn admins(&self) -> &dyn AdminRepository {
        &self.admins
    }
}
