//! Repository traits and the unified provider

pub mod lot;
pub mod session;
pub mod slot;
pub mod user;
pub mod wallet;

pub use lot::LotRepository;
pub use session::{SessionCounters, SessionFilter, SessionRepository};
pub use slot::{SlotCounts, SlotRepository};
pub use user::{AdminRepository, UserRepository};
pub use wallet::WalletRepository;

/// Unified access point to all repositories.
///
/// Services hold an `Arc<dyn RepositoryProvider>` and never see concrete
/// storage types; the SeaORM provider backs production, the in-memory
/// provider backs tests.
pub trait RepositoryProvider: Send + Sync {
    fn slots(&self) -> &dyn SlotRepository;
    fn sessions(&self) -> &dyn SessionRepository;
    fn wallets(&self) -> &dyn WalletRepository;
    fn lots(&self) -> &dyn LotRepository;
    fn users(&self) -> &dyn UserRepository;
    fn admins(&self) -> &dyn AdminRepository;
}
