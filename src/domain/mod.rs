//! Core business entities, types and repository traits

pub mod error;
pub mod models;
pub mod repositories;

pub use error::{DomainError, DomainResult};
pub use models::*;
pub use repositories::{
    AdminRepository, LotRepository, RepositoryProvider, SessionCounters, SessionFilter,
    SessionRepository, SlotCounts, SlotRepository, UserRepository, WalletRepository,
};
