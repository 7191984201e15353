//! Authentication and Authorization module
//!
//! Provides JWT token-based authentication for the dashboard and the
//! mobile-app API.

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{create_token, verify_token, Claims, JwtConfig};
pub use middleware::{admin_auth_middleware, user_auth_middleware, AuthState, AuthenticatedUser};
pub use password::{hash_password, verify_password};
