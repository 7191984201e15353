//! # SmartPark Central Service
//!
//! Backend for a parking-lot management platform: gate entry/exit
//! coordination, slot allocation, wallet-based fare payment and
//! ANPR-driven plate detection.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Core business entities, types and repository traits
//! - **application**: Business logic (parking coordinator, wallet service) and outbound ports
//! - **infrastructure**: External concerns (database, in-memory store, ANPR client, push delivery)
//! - **api**: REST API with Swagger documentation
//! - **auth**: JWT authentication for admin and app users

pub mod api;
pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::database::{init_database, DatabaseConfig};
pub use infrastructure::database::repositories::SeaOrmRepositoryProvider;

// Re-export API router
pub use api::create_api_router;
