//! Application services

pub mod parking;
pub mod wallet;

pub use parking::{EntryGrant, EntryOutcome, ExitOutcome, ExitSummary, GateAction, ParkingService};
pub use wallet::{FareDebit, WalletService};
