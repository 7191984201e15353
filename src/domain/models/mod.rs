//! Domain entities and value objects

pub mod lot;
pub mod session;
pub mod slot;
pub mod user;
pub mod wallet;

pub use lot::{FareBreakdown, ParkingLot, Pricing};
pub use session::{normalize_plate, NewSession, ParkingSession, PaymentStatus, SessionStatus};
pub use slot::{Slot, SlotStatus, VehicleType};
pub use user::{AdminRole, AdminUser, User};
pub use wallet::{TransactionKind, Wallet, WalletTransaction};
