//! API data transfer objects

pub mod common;
pub mod parking;

pub use common::{ApiResponse, EmptyData, PaginatedResponse, PaginationParams};
pub use parking::{LotDto, SessionDto, SlotDto, TransactionDto, WalletDto};
