//! SeaORM entities

pub mod admin_user;
pub mod app_user;
pub mod parking_lot;
pub mod parking_session;
pub mod parking_slot;
pub mod user_vehicle;
pub mod wallet;
pub mod wallet_transaction;
