//! Business logic and outbound ports

pub mod ports;
pub mod services;

pub use ports::{best_plate, Notification, Notifier, NoopNotifier, PlateDetection, PlateDetector};
pub use services::{ParkingService, WalletService};
