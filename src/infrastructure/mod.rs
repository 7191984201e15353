//! Infrastructure layer: storage, external services

pub mod anpr;
pub mod database;
pub mod memory;
pub mod push;
