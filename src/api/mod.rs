//! REST API module
//!
//! HTTP endpoints for gate hardware, the admin dashboard and the
//! mobile app.

pub mod dto;
pub mod handlers;
pub mod router;

pub use router::{create_api_router, ApiDoc};
