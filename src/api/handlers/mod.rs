//! API Handlers

pub mod anpr;
pub mod app;
pub mod app_auth;
pub mod auth;
pub mod dashboard;
pub mod gate;
pub mod health;
pub mod lots;
pub mod sessions;
pub mod wallet;

pub use anpr::AnprState;
pub use app::AppState;
pub use app_auth::AppAuthState;
pub use auth::AdminAuthState;
pub use dashboard::DashboardState;
pub use gate::GateState;
pub use lots::LotAdminState;
pub use sessions::SessionAdminState;
pub use wallet::WalletHandlerState;
