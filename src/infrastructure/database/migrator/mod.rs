//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240201_000001_create_parking_lots;
mod m20240201_000002_create_parking_slots;
mod m20240201_000003_create_parking_sessions;
mod m20240201_000004_create_wallets;
mod m20240201_000005_create_wallet_transactions;
mod m20240201_000006_create_app_users;
mod m20240201_000007_create_user_vehicles;
mod m20240201_000008_create_admin_users;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240201_000001_create_parking_lots::Migration),
            Box::new(m20240201_000002_create_parking_slots::Migration),
            Box::new(m20240201_000003_create_parking_sessions::Migration),
            Box::new(m20240201_000004_create_wallets::Migration),
            Box::new(m20240201_000005_create_wallet_transactions::Migration),
            Box::new(m20240201_000006_create_app_users::Migration),
            Box::new(m20240201_000007_create_user_vehicles::Migration),
            Box::new(m20240201_000008_create_admin_users::Migration),
        ]
    }
}
