//! Request/response DTOs for the admin API.

pub mod health;
pub mod progress;
pub mod send;
