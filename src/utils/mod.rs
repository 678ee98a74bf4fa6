//! Shared utilities.

pub mod token;
