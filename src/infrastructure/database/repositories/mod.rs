//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod lot_repository;
pub mod repository_provider;
pub mod session_repository;
pub mod slot_repository;
pub mod user_repository;
pub mod wallet_repository;

pub use repository_provider::SeaOrmRepositoryProvider;
